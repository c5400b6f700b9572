//! Graph-to-component reconciliation.

pub mod components;
pub mod service;

pub use components::ParentCandidates;
pub use service::{
    EdgeInput, GraphPayload, ModelGraph, NewModelRequest, NodeInput, ReconcileService,
};
