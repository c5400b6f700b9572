//! Core data representation: identifiers, records, kind tags, errors.

pub mod entities;
pub mod errors;
pub mod identifiers;
pub mod types;

pub use entities::{
    Bridge, Component, ComponentBase, ComponentKind, DataModel, Edge, Hub, Link, Node,
    PointInTime, Reference, Satellite,
};
pub use errors::{CoreError, StoreError};
pub use identifiers::{ComponentId, EdgeId, ModelId, NodeId};
pub use types::{NodeKind, PayloadExt, ReferenceKind, SatelliteKind, Severity};
