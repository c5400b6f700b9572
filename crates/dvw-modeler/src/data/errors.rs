//! Error types for the Data Vault modeler

use thiserror::Error;

/// Engine-level error type, surfaced to callers of the reconciliation and
/// validation services.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Request entry missing or contradicting required identity/type data.
    /// Rejected before any mutation.
    #[error("Malformed request: {entity}: {detail}")]
    MalformedRequest { entity: String, detail: String },

    #[error("Not found: type={entity_type} id={id}")]
    NotFound { entity_type: String, id: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn malformed(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::MalformedRequest {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        CoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }
}

/// Collaborator-level error type returned by [`crate::traits::ModelStore`]
/// implementations. Terminal for the enclosing request; the engine performs
/// no retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Data mapping error: {0}")]
    Mapping(String),
}
