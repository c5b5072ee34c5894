//! Players and their holdings
//!
//! A player owns artifacts and a set of prerequisite markers. Both are plain
//! ids: event requirements and artifact requirements are satisfied by either.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::error::{GloryError, Result};
use crate::core::types::{Allegiance, ArtifactId, CountryId};

/// Artifact blueprint from the artifact catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub id: ArtifactId,
    #[serde(default)]
    pub description: String,
    /// Holdings the player must already have before receiving it
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub consumable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Player {
    pub allegiance: Allegiance,
    #[serde(default)]
    pub is_ai: bool,
    #[serde(default)]
    pub artifacts: BTreeSet<ArtifactId>,
    #[serde(default)]
    pub prerequisites: BTreeSet<String>,
    #[serde(default)]
    pub controlled_countries: BTreeSet<CountryId>,
}

impl Player {
    pub fn new(allegiance: Allegiance) -> Self {
        Self {
            allegiance,
            ..Self::default()
        }
    }

    pub fn add_artifact(&mut self, artifact: ArtifactId) {
        self.artifacts.insert(artifact);
    }

    pub fn remove_artifact(&mut self, artifact: &ArtifactId) -> bool {
        self.artifacts.remove(artifact)
    }

    pub fn has_artifact(&self, artifact: &ArtifactId) -> bool {
        self.artifacts.contains(artifact)
    }

    pub fn add_prerequisite(&mut self, prerequisite: impl Into<String>) {
        self.prerequisites.insert(prerequisite.into());
    }

    /// True when the player holds `requirement` as an artifact or prerequisite
    pub fn holds(&self, requirement: &str) -> bool {
        self.prerequisites.contains(requirement)
            || self.artifacts.iter().any(|a| a.0 == requirement)
    }

    /// Requirements from `requirements` the player does not hold
    pub fn missing<'a>(&self, requirements: &'a [String]) -> Vec<&'a String> {
        requirements.iter().filter(|r| !self.holds(r)).collect()
    }

    /// Give the player an artifact if its requirements are met
    pub fn grant_artifact(&mut self, spec: &ArtifactSpec) -> Result<()> {
        let missing = self.missing(&spec.requirements);
        if !missing.is_empty() {
            return Err(GloryError::RequirementsUnmet {
                artifact: spec.id.clone(),
                missing: missing.into_iter().cloned().collect(),
            });
        }
        self.add_artifact(spec.id.clone());
        Ok(())
    }
}
