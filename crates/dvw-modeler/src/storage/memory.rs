use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::data::{
    Component, ComponentId, ComponentKind, DataModel, Edge, EdgeId, ModelId, Node, NodeId,
    StoreError,
};
use crate::traits::{ApplyReport, ComponentOp, ModelChangeSet, ModelStore, NodeOutcome};

#[derive(Default)]
struct Inner {
    models: HashMap<ModelId, DataModel>,
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    components: HashMap<ComponentId, Component>,
}

impl Inner {
    fn component_for_node(&self, node_id: NodeId) -> Option<&Component> {
        self.components.values().find(|c| c.node_id() == node_id)
    }

    /// `(model, kind, name)` must be unique; `exclude` skips the record being
    /// updated.
    fn name_taken(
        &self,
        model_id: ModelId,
        kind: ComponentKind,
        name: &str,
        exclude: Option<ComponentId>,
    ) -> bool {
        self.components.values().any(|c| {
            c.model_id() == model_id
                && c.kind() == kind
                && c.name() == name
                && Some(c.id()) != exclude
        })
    }

    fn delete_node_cascade(&mut self, node_id: NodeId) {
        self.nodes.remove(&node_id);
        self.components.retain(|_, c| c.node_id() != node_id);
    }

    fn apply_component_op(&mut self, op: ComponentOp) -> NodeOutcome {
        let component = op.component();
        let node_id = component.node_id();
        let kind = component.kind();

        let node = match self.nodes.get(&node_id) {
            Some(node) => node,
            None => {
                return NodeOutcome::failed(node_id, kind, "owning node does not exist");
            }
        };
        if ComponentKind::from(node.kind) != kind {
            return NodeOutcome::failed(
                node_id,
                kind,
                format!("component kind {} does not match node type {}", kind, node.kind),
            );
        }

        match op {
            ComponentOp::Create(mut component) => {
                if let Some(existing) = self.component_for_node(node_id) {
                    if existing.kind() == kind {
                        return NodeOutcome::failed(node_id, kind, "node already has a component");
                    }
                    // The node was retyped; its old-kind component is
                    // superseded so the kind invariant holds.
                    let stale = existing.id();
                    self.components.remove(&stale);
                }
                if self.name_taken(component.model_id(), kind, component.name(), None) {
                    return NodeOutcome::failed(
                        node_id,
                        kind,
                        format!("{} name '{}' already in use", kind, component.name()),
                    );
                }
                let id = component.id();
                let now = Utc::now();
                component.base_mut().created_at = now;
                component.base_mut().updated_at = now;
                self.components.insert(id, component);
                NodeOutcome::synced(node_id, kind, id)
            }
            ComponentOp::Update(mut component) => {
                let existing = match self.components.get(&component.id()) {
                    Some(existing) if existing.kind() == kind => existing,
                    _ => {
                        return NodeOutcome::failed(node_id, kind, "component to update not found");
                    }
                };
                if self.name_taken(
                    component.model_id(),
                    kind,
                    component.name(),
                    Some(component.id()),
                ) {
                    return NodeOutcome::failed(
                        node_id,
                        kind,
                        format!("{} name '{}' already in use", kind, component.name()),
                    );
                }
                let id = component.id();
                component.base_mut().created_at = existing.base().created_at;
                component.base_mut().updated_at = Utc::now();
                self.components.insert(id, component);
                NodeOutcome::synced(node_id, kind, id)
            }
        }
    }
}

/// In-memory [`ModelStore`] implementation. One lock guards all maps, so a
/// change set commits atomically under the write guard.
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn create_model(&self, model: DataModel) -> Result<DataModel, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.models.contains_key(&model.id) {
            return Err(StoreError::Conflict(format!("model {} already exists", model.id)));
        }
        inner.models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn get_model(&self, id: ModelId) -> Result<Option<DataModel>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.models.get(&id).cloned())
    }

    async fn list_models(&self) -> Result<Vec<DataModel>, StoreError> {
        let inner = self.inner.read().await;
        let mut models: Vec<DataModel> = inner.models.values().cloned().collect();
        models.sort_by_key(|m| (m.created_at, m.id));
        Ok(models)
    }

    async fn update_model(&self, mut model: DataModel) -> Result<DataModel, StoreError> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .models
            .get(&model.id)
            .ok_or_else(|| StoreError::NotFound(format!("model {}", model.id)))?;
        model.created_at = existing.created_at;
        model.updated_at = Utc::now();
        inner.models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn delete_model(&self, id: ModelId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .models
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("model {}", id)))?;
        inner.nodes.retain(|_, n| n.model_id != id);
        inner.edges.retain(|_, e| e.model_id != id);
        inner.components.retain(|_, c| c.model_id() != id);
        Ok(())
    }

    async fn get_nodes(&self, model_id: ModelId) -> Result<Vec<Node>, StoreError> {
        let inner = self.inner.read().await;
        let mut nodes: Vec<Node> = inner
            .nodes
            .values()
            .filter(|n| n.model_id == model_id)
            .cloned()
            .collect();
        nodes.sort_by_key(|n| (n.created_at, n.id));
        Ok(nodes)
    }

    async fn get_edges(&self, model_id: ModelId) -> Result<Vec<Edge>, StoreError> {
        let inner = self.inner.read().await;
        let mut edges: Vec<Edge> = inner
            .edges
            .values()
            .filter(|e| e.model_id == model_id)
            .cloned()
            .collect();
        edges.sort_by_key(|e| (e.created_at, e.id));
        Ok(edges)
    }

    async fn get_component(
        &self,
        kind: ComponentKind,
        node_id: NodeId,
    ) -> Result<Option<Component>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .components
            .values()
            .find(|c| c.node_id() == node_id && c.kind() == kind)
            .cloned())
    }

    async fn get_component_by_id(
        &self,
        kind: ComponentKind,
        id: ComponentId,
    ) -> Result<Option<Component>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .components
            .get(&id)
            .filter(|c| c.kind() == kind)
            .cloned())
    }

    async fn components_for_model(
        &self,
        kind: ComponentKind,
        model_id: ModelId,
    ) -> Result<Vec<Component>, StoreError> {
        let inner = self.inner.read().await;
        let mut components: Vec<Component> = inner
            .components
            .values()
            .filter(|c| c.model_id() == model_id && c.kind() == kind)
            .cloned()
            .collect();
        components.sort_by_key(|c| (c.base().created_at, c.id()));
        Ok(components)
    }

    async fn apply(
        &self,
        model_id: ModelId,
        change: ModelChangeSet,
    ) -> Result<ApplyReport, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.models.contains_key(&model_id) {
            return Err(StoreError::NotFound(format!("model {}", model_id)));
        }

        // Validate before mutating so a hard failure leaves the maps untouched.
        for node in &change.upsert_nodes {
            if node.model_id != model_id {
                return Err(StoreError::Mapping(format!(
                    "node {} belongs to model {}, not {}",
                    node.id, node.model_id, model_id
                )));
            }
        }
        for edge in &change.upsert_edges {
            if edge.model_id != model_id {
                return Err(StoreError::Mapping(format!(
                    "edge {} belongs to model {}, not {}",
                    edge.id, edge.model_id, model_id
                )));
            }
        }

        for node_id in &change.delete_nodes {
            inner.delete_node_cascade(*node_id);
        }
        for mut node in change.upsert_nodes {
            if let Some(existing) = inner.nodes.get(&node.id) {
                node.created_at = existing.created_at;
            }
            node.updated_at = Utc::now();
            inner.nodes.insert(node.id, node);
        }
        for edge_id in &change.delete_edges {
            inner.edges.remove(edge_id);
        }
        for mut edge in change.upsert_edges {
            if let Some(existing) = inner.edges.get(&edge.id) {
                edge.created_at = existing.created_at;
            }
            edge.updated_at = Utc::now();
            inner.edges.insert(edge.id, edge);
        }

        let mut report = ApplyReport::default();
        for op in change.component_ops {
            let outcome = inner.apply_component_op(op);
            if let Some(error) = &outcome.error {
                debug!(node_id = %outcome.node_id, kind = %outcome.kind, error = %error,
                       "component op failed");
            }
            report.outcomes.push(outcome);
        }

        if let Some(model) = inner.models.get_mut(&model_id) {
            model.updated_at = Utc::now();
        }
        Ok(report)
    }
}
