//! ModelStore trait definition for graph and component persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{
    Component, ComponentId, ComponentKind, DataModel, Edge, EdgeId, ModelId, Node, NodeId,
    StoreError,
};

/// A create-or-update instruction for one typed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ComponentOp {
    Create(Component),
    Update(Component),
}

impl ComponentOp {
    pub fn component(&self) -> &Component {
        match self {
            ComponentOp::Create(c) | ComponentOp::Update(c) => c,
        }
    }
}

/// The full set of writes one reconciliation request produces, applied by the
/// store in a single atomic step for nodes and edges. Component ops are
/// applied per item: an individual failure is reported in the
/// [`ApplyReport`], never raised, so a broken component leaves its node
/// persisted but unsynchronized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelChangeSet {
    pub delete_nodes: Vec<NodeId>,
    pub upsert_nodes: Vec<Node>,
    pub delete_edges: Vec<EdgeId>,
    pub upsert_edges: Vec<Edge>,
    pub component_ops: Vec<ComponentOp>,
}

impl ModelChangeSet {
    pub fn is_empty(&self) -> bool {
        self.delete_nodes.is_empty()
            && self.upsert_nodes.is_empty()
            && self.delete_edges.is_empty()
            && self.upsert_edges.is_empty()
            && self.component_ops.is_empty()
    }
}

/// Per-node result of component synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOutcome {
    pub node_id: NodeId,
    pub kind: ComponentKind,
    pub component_id: Option<ComponentId>,
    pub error: Option<String>,
}

impl NodeOutcome {
    pub fn synced(node_id: NodeId, kind: ComponentKind, component_id: ComponentId) -> Self {
        Self {
            node_id,
            kind,
            component_id: Some(component_id),
            error: None,
        }
    }

    pub fn failed(node_id: NodeId, kind: ComponentKind, error: impl Into<String>) -> Self {
        Self {
            node_id,
            kind,
            component_id: None,
            error: Some(error.into()),
        }
    }

    pub fn is_synced(&self) -> bool {
        self.error.is_none()
    }
}

/// What a [`ModelChangeSet`] application actually did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub outcomes: Vec<NodeOutcome>,
}

impl ApplyReport {
    pub fn failed_nodes(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.outcomes.iter().filter(|o| !o.is_synced())
    }
}

/// Persistence boundary consumed by the reconciliation and validation
/// engines. Implementations must guarantee:
///
/// - node/edge changes in [`ModelStore::apply`] commit atomically;
/// - deleting a node cascades its component, deleting a model cascades
///   everything it owns;
/// - listing methods iterate in creation order (stable for a given backend),
///   which the engines rely on for deterministic validation output and
///   satellite parent fallback;
/// - `(model, kind, name)` uniqueness and one-component-per-node are
///   enforced when component ops apply; a violating op becomes a failed
///   [`NodeOutcome`], never a request-level error.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn create_model(&self, model: DataModel) -> Result<DataModel, StoreError>;
    async fn get_model(&self, id: ModelId) -> Result<Option<DataModel>, StoreError>;
    async fn list_models(&self) -> Result<Vec<DataModel>, StoreError>;
    async fn update_model(&self, model: DataModel) -> Result<DataModel, StoreError>;

    /// Deletes the model and cascades to its nodes, edges and components.
    async fn delete_model(&self, id: ModelId) -> Result<(), StoreError>;

    async fn get_nodes(&self, model_id: ModelId) -> Result<Vec<Node>, StoreError>;
    async fn get_edges(&self, model_id: ModelId) -> Result<Vec<Edge>, StoreError>;

    /// Looks up the typed component owned by `node_id`, if any.
    async fn get_component(
        &self,
        kind: ComponentKind,
        node_id: NodeId,
    ) -> Result<Option<Component>, StoreError>;

    async fn get_component_by_id(
        &self,
        kind: ComponentKind,
        id: ComponentId,
    ) -> Result<Option<Component>, StoreError>;

    /// All components of one kind in a model, in creation order.
    async fn components_for_model(
        &self,
        kind: ComponentKind,
        model_id: ModelId,
    ) -> Result<Vec<Component>, StoreError>;

    /// Applies a change set. Returns `Err` only for request-level failures
    /// (unknown model, malformed records); per-component failures come back
    /// as [`NodeOutcome`] entries.
    async fn apply(
        &self,
        model_id: ModelId,
        change: ModelChangeSet,
    ) -> Result<ApplyReport, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_change_set() {
        assert!(ModelChangeSet::default().is_empty());
    }

    #[test]
    fn test_node_outcome_status() {
        let node_id = NodeId::new_v4();
        let ok = NodeOutcome::synced(node_id, ComponentKind::Hub, ComponentId::new_v4());
        assert!(ok.is_synced());

        let failed = NodeOutcome::failed(node_id, ComponentKind::Hub, "duplicate name");
        assert!(!failed.is_synced());
        assert_eq!(failed.error.as_deref(), Some("duplicate name"));
    }

    #[test]
    fn test_apply_report_failed_nodes() {
        let report = ApplyReport {
            outcomes: vec![
                NodeOutcome::synced(NodeId::new_v4(), ComponentKind::Hub, ComponentId::new_v4()),
                NodeOutcome::failed(NodeId::new_v4(), ComponentKind::Link, "boom"),
            ],
        };
        assert_eq!(report.failed_nodes().count(), 1);
    }
}
