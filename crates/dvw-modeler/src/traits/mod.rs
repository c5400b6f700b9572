//! Trait definitions for external collaborators.

pub mod model_store;

pub use model_store::{ApplyReport, ComponentOp, ModelChangeSet, ModelStore, NodeOutcome};
