//! Data Vault modeler core: reconciles a client-drawn diagram graph into
//! typed Data Vault components (Hubs, Links, Satellites, References,
//! Point-in-Time tables, Bridges) and validates the result against
//! Data Vault naming and structure rules.

pub mod data;
pub mod services;
pub mod storage;
pub mod traits;

pub mod test_utils;

// Re-export key types for convenient usage
pub use data::entities::{
    Bridge, Component, ComponentBase, ComponentKind, DataModel, Edge, Hub, Link, Node,
    PointInTime, Reference, Satellite,
};
pub use data::errors::{CoreError, StoreError};
pub use data::identifiers::{ComponentId, EdgeId, ModelId, NodeId};
pub use data::types::{NodeKind, PayloadExt, ReferenceKind, SatelliteKind, Severity};

pub use traits::{
    ApplyReport, ComponentOp, ModelChangeSet, ModelStore, NodeOutcome,
};

pub use storage::MemoryStore;

pub use services::{
    extract, EdgeInput, ExtractedProperties, Finding, GraphPayload, ModelGraph, NewModelRequest,
    NodeInput, ReconcileService, ValidationConfig, ValidationResult, ValidationService,
    ValidationSummary,
};

/// Initialize tracing for the modeler
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
