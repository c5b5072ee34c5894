//! Strategic events: catalog, per-game pool and resolution engine

pub mod catalog;
pub mod definition;
pub mod engine;
pub mod pool;
pub mod rules;

pub use catalog::EventCatalog;
pub use definition::{describe_effect, EventDefinition, EventEffect, OccurrencePolicy, Trigger, UnlockSpec};
pub use engine::{apply_effect, EnginePhase, EventEngine, FiredEvent, PhaseOutcome};
pub use pool::{DrawContext, EventSelector, GameEventPool, PoolEntry, Remaining, UniformSelector, WeightedSelector};
pub use rules::{ActiveEventsAdjustment, OccurrenceAdjustment, PossibleEvent, PossibleEventsFilter, ScenarioEventRules};
