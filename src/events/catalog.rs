//! Event catalog: every event definition known to a session

use ahash::AHashMap;
use tracing::debug;

use crate::core::error::{GloryError, Result};
use crate::core::types::EventId;
use crate::events::definition::EventDefinition;

/// Read-only set of event definitions, kept in load order
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    definitions: Vec<EventDefinition>,
    index: AHashMap<EventId, usize>,
}

impl EventCatalog {
    /// Build the catalog, rejecting duplicate ids and unusable weights
    pub fn from_definitions(definitions: Vec<EventDefinition>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(definitions.len());
        for (i, def) in definitions.iter().enumerate() {
            if let Some(p) = def.probability {
                if !p.is_finite() || p <= 0.0 {
                    return Err(GloryError::invalid_rule(
                        def.id.to_string(),
                        format!("probability must be positive, got {p}"),
                    ));
                }
            }
            if index.insert(def.id.clone(), i).is_some() {
                return Err(GloryError::invalid_rule(def.id.to_string(), "event defined twice"));
            }
        }
        debug!(events = definitions.len(), "Event catalog loaded");
        Ok(Self { definitions, index })
    }

    pub fn lookup(&self, id: &EventId) -> Result<&EventDefinition> {
        self.index
            .get(id)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| GloryError::UnknownEvent(id.clone()))
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
