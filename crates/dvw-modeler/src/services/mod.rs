//! Engine services: property extraction, reconciliation and validation.

pub mod extractor;
pub mod reconcile;
pub mod validation;

pub use extractor::{extract, ExtractedProperties};
pub use reconcile::{
    EdgeInput, GraphPayload, ModelGraph, NewModelRequest, NodeInput, ReconcileService,
};
pub use validation::{
    Finding, ValidationConfig, ValidationResult, ValidationService, ValidationSummary,
};
