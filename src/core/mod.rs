pub mod config;
pub mod error;
pub mod types;

pub use config::RulesConfig;
pub use error::{GloryError, Result};
pub use types::{Allegiance, ArtifactId, CountryId, EventId, Turn, UnitId};
