//! Validation engine: pure rule evaluation over stored components.
//!
//! Findings are data, never errors: a failed rule lands in the returned
//! [`ValidationResult`], and only store or lookup problems surface as
//! [`CoreError`]. For a fixed stored state the engine is deterministic;
//! findings follow the store's creation-order iteration.

pub mod naming;
pub mod structure;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::data::{Component, ComponentId, ComponentKind, CoreError, ModelId, Severity};
use crate::traits::ModelStore;

/// One failed rule, before it is tagged with the owning component.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    pub field: &'static str,
    pub message: String,
    pub severity: Severity,
}

impl RuleFinding {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// A validation finding tagged with the component it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub component_type: ComponentKind,
    pub component_id: ComponentId,
    pub field: Option<String>,
    pub message: String,
    pub severity: Severity,
}

/// How many components of each kind a validation run looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub hubs: usize,
    pub links: usize,
    pub satellites: usize,
    pub references: usize,
    pub point_in_times: usize,
    pub bridges: usize,
}

impl ValidationSummary {
    fn record(&mut self, kind: ComponentKind) {
        match kind {
            ComponentKind::Hub => self.hubs += 1,
            ComponentKind::Link => self.links += 1,
            ComponentKind::Satellite => self.satellites += 1,
            ComponentKind::Reference => self.references += 1,
            ComponentKind::PointInTime => self.point_in_times += 1,
            ComponentKind::Bridge => self.bridges += 1,
        }
    }

    pub fn components_validated(&self) -> usize {
        self.hubs + self.links + self.satellites + self.references + self.point_in_times
            + self.bridges
    }
}

/// Outcome of a validation run. `is_valid` is true iff no error-severity
/// finding was recorded; warnings never affect it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub summary: ValidationSummary,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    fn record(&mut self, component: &Component, finding: RuleFinding) {
        let finding = Finding {
            component_type: component.kind(),
            component_id: component.id(),
            field: Some(finding.field.to_string()),
            message: finding.message,
            severity: finding.severity,
        };
        match finding.severity {
            Severity::Error => {
                self.is_valid = false;
                self.errors.push(finding);
            }
            Severity::Warning => self.warnings.push(finding),
        }
    }
}

/// Tunable rule severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Severity of the "transactional link should have attributes" rule.
    pub transactional_link_attributes: Severity,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            transactional_link_attributes: Severity::Error,
        }
    }
}

/// Validation service over a [`ModelStore`]. Reads only; concurrent calls
/// never contend beyond the store's own read locking.
pub struct ValidationService {
    store: Arc<dyn ModelStore>,
    config: ValidationConfig,
}

impl ValidationService {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self::with_config(store, ValidationConfig::default())
    }

    pub fn with_config(store: Arc<dyn ModelStore>, config: ValidationConfig) -> Self {
        Self { store, config }
    }

    /// Validates a single stored component.
    #[instrument(skip(self), fields(kind = %kind, component_id = %component_id))]
    pub async fn validate_component(
        &self,
        kind: ComponentKind,
        component_id: ComponentId,
    ) -> Result<ValidationResult, CoreError> {
        let component = self
            .store
            .get_component_by_id(kind, component_id)
            .await?
            .ok_or_else(|| CoreError::not_found(kind.as_str(), component_id))?;

        let mut result = ValidationResult::new();
        self.check_component(&component, &mut result);
        result.summary.record(kind);
        Ok(result)
    }

    /// Validates every component of a model and unions the findings.
    #[instrument(skip(self), fields(model_id = %model_id))]
    pub async fn validate_model(&self, model_id: ModelId) -> Result<ValidationResult, CoreError> {
        self.store
            .get_model(model_id)
            .await?
            .ok_or_else(|| CoreError::not_found("model", model_id))?;

        let mut result = ValidationResult::new();
        for kind in ComponentKind::ALL {
            for component in self.store.components_for_model(kind, model_id).await? {
                self.check_component(&component, &mut result);
                result.summary.record(kind);
            }
        }
        self.check_model_consistency(&mut result);

        info!(
            components = result.summary.components_validated(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "model validated"
        );
        Ok(result)
    }

    fn check_component(&self, component: &Component, result: &mut ValidationResult) {
        let findings = match component {
            Component::Hub(hub) => {
                let mut findings = naming::check_hub(hub);
                findings.extend(structure::check_hub(hub));
                findings
            }
            Component::Link(link) => {
                let mut findings = naming::check_link(link);
                findings.extend(structure::check_link(
                    link,
                    self.config.transactional_link_attributes,
                ));
                findings
            }
            Component::Satellite(satellite) => {
                let mut findings = naming::check_satellite(satellite);
                findings.extend(structure::check_satellite(satellite));
                findings
            }
            // Reference, PIT and Bridge rules are declared but not written
            // yet; they must report nothing rather than guess.
            Component::Reference(_) | Component::PointInTime(_) | Component::Bridge(_) => {
                Vec::new()
            }
        };
        for finding in findings {
            result.record(component, finding);
        }
    }

    // Cross-component rules (satellite parents resolving, orphan detection,
    // connection patterns) are not implemented; reports nothing.
    fn check_model_consistency(&self, _result: &mut ValidationResult) {}
}
