//! Reconciliation engine: converges a model's stored nodes, edges and typed
//! components to a client-supplied desired graph.
//!
//! Node and edge changes for one request are batched into a single
//! [`ModelChangeSet`] so the store commits them atomically. Component
//! synchronization is the deliberate exception: each component op may fail
//! on its own and comes back as a [`NodeOutcome`] instead of failing the
//! request, leaving the node persisted without a synchronized component.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::data::{
    Component, ComponentKind, CoreError, DataModel, Edge, EdgeId, ModelId, Node, NodeId, NodeKind,
};
use crate::services::extractor::{self, ExtractedProperties};
use crate::services::reconcile::components::{build_component, update_component, ParentCandidates};
use crate::traits::{ComponentOp, ModelChangeSet, ModelStore, NodeOutcome};

/// One desired node in a reconciliation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// One desired edge in a reconciliation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// The full desired graph for one model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}

/// Request to create a model together with its initial graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewModelRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub graph: GraphPayload,
}

/// Converged state returned by the reconciliation entry points: the model,
/// its stored nodes and edges, and the per-node component outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGraph {
    pub model: DataModel,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub outcomes: Vec<NodeOutcome>,
}

/// Reconciliation service over a [`ModelStore`].
pub struct ReconcileService {
    store: Arc<dyn ModelStore>,
}

impl ReconcileService {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// Creates a new model from a full graph payload. Client node and edge
    /// ids are never stored: fresh ids are assigned throughout and edge
    /// endpoints remapped through the substitution, so clients that
    /// pre-generate ids cannot collide with existing records.
    #[instrument(skip(self, request), fields(model_name = %request.name))]
    pub async fn reconcile_create(&self, request: NewModelRequest) -> Result<ModelGraph, CoreError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CoreError::malformed("model", "name must not be empty"));
        }
        validate_payload(&request.graph)?;

        let mut model = DataModel::new(name);
        model.description = request.description;
        model.tags = request.tags;
        let model = self.store.create_model(model).await?;

        let translation: HashMap<NodeId, NodeId> = request
            .graph
            .nodes
            .iter()
            .map(|input| (input.id, NodeId::new_v4()))
            .collect();

        let mut change = ModelChangeSet::default();
        let mut parents = ParentCandidates::default();
        for input in &request.graph.nodes {
            let (node, extracted) = node_record(translation[&input.id], model.id, input);
            let component = build_component(&node, &extracted, &parents);
            register_parent(&mut parents, &component);
            change.component_ops.push(ComponentOp::Create(component));
            change.upsert_nodes.push(node);
        }
        for input in &request.graph.edges {
            change.upsert_edges.push(edge_record(
                EdgeId::new_v4(),
                model.id,
                translation[&input.source],
                translation[&input.target],
                input.payload.clone(),
            ));
        }

        let report = self.apply_or_discard(model.id, change).await?;
        self.finish(model.id, report.outcomes, "model created").await
    }

    /// Converges an existing model to the desired graph: stored nodes and
    /// edges absent from the payload are deleted, payload entries are
    /// upserted by their client-supplied ids, and every surviving node's
    /// typed component is created or updated from its payload. Applying the
    /// same payload twice leaves the stored state unchanged.
    #[instrument(skip(self, payload), fields(model_id = %model_id))]
    pub async fn reconcile_update(
        &self,
        model_id: ModelId,
        payload: GraphPayload,
    ) -> Result<ModelGraph, CoreError> {
        self.require_model(model_id).await?;
        validate_payload(&payload)?;
        let stored_nodes = self.store.get_nodes(model_id).await?;
        let stored_edges = self.store.get_edges(model_id).await?;

        let incoming_ids: HashSet<NodeId> = payload.nodes.iter().map(|n| n.id).collect();
        let incoming_edge_ids: HashSet<EdgeId> = payload.edges.iter().map(|e| e.id).collect();

        let mut change = ModelChangeSet::default();
        change.delete_nodes = stored_nodes
            .iter()
            .filter(|n| !incoming_ids.contains(&n.id))
            .map(|n| n.id)
            .collect();
        change.delete_edges = stored_edges
            .iter()
            .filter(|e| !incoming_edge_ids.contains(&e.id))
            .map(|e| e.id)
            .collect();

        let mut parents = self.surviving_parents(model_id, &incoming_ids).await?;
        for input in &payload.nodes {
            let (node, extracted) = node_record(input.id, model_id, input);
            let kind = ComponentKind::from(node.kind);
            let component = match self.store.get_component(kind, node.id).await? {
                Some(existing) => {
                    let updated = update_component(&existing, &node, &extracted, &parents);
                    register_parent(&mut parents, &updated);
                    ComponentOp::Update(updated)
                }
                None => {
                    let built = build_component(&node, &extracted, &parents);
                    register_parent(&mut parents, &built);
                    ComponentOp::Create(built)
                }
            };
            change.component_ops.push(component);
            change.upsert_nodes.push(node);
        }
        for input in &payload.edges {
            change.upsert_edges.push(edge_record(
                input.id,
                model_id,
                input.source,
                input.target,
                input.payload.clone(),
            ));
        }

        let report = self.store.apply(model_id, change).await?;
        self.finish(model_id, report.outcomes, "model reconciled").await
    }

    /// Copies a model with all its nodes and edges under fresh ids, edge
    /// endpoints remapped. Typed components are not copied: the clone's
    /// nodes start unsynchronized until the next reconciliation touches
    /// them.
    #[instrument(skip(self), fields(model_id = %model_id))]
    pub async fn clone_model(
        &self,
        model_id: ModelId,
        new_name: &str,
    ) -> Result<ModelGraph, CoreError> {
        let source = self.require_model(model_id).await?;
        let nodes = self.store.get_nodes(model_id).await?;
        let edges = self.store.get_edges(model_id).await?;

        let name = new_name.trim();
        let mut clone = DataModel::new(if name.is_empty() {
            format!("{} (Copy)", source.name)
        } else {
            name.to_string()
        });
        clone.description = source.description.clone();
        clone.version = source.version.clone();
        clone.tags = source.tags.clone();
        let clone = self.store.create_model(clone).await?;

        let translation: HashMap<NodeId, NodeId> =
            nodes.iter().map(|n| (n.id, NodeId::new_v4())).collect();

        let mut change = ModelChangeSet::default();
        for node in nodes {
            let mut copy = node;
            copy.id = translation[&copy.id];
            copy.model_id = clone.id;
            change.upsert_nodes.push(copy);
        }
        for edge in edges {
            let mut copy = edge;
            copy.id = EdgeId::new_v4();
            copy.model_id = clone.id;
            copy.source = translation[&copy.source];
            copy.target = translation[&copy.target];
            change.upsert_edges.push(copy);
        }

        self.apply_or_discard(clone.id, change).await?;
        info!(source = %model_id, clone = %clone.id, "model cloned");
        self.finish(clone.id, Vec::new(), "clone ready").await
    }

    /// Deletes a model and everything it owns.
    #[instrument(skip(self), fields(model_id = %model_id))]
    pub async fn delete_model(&self, model_id: ModelId) -> Result<(), CoreError> {
        self.require_model(model_id).await?;
        self.store.delete_model(model_id).await?;
        info!("model deleted");
        Ok(())
    }

    /// Current stored state of a model, without mutating anything.
    pub async fn model_graph(&self, model_id: ModelId) -> Result<ModelGraph, CoreError> {
        let model = self.require_model(model_id).await?;
        Ok(ModelGraph {
            nodes: self.store.get_nodes(model_id).await?,
            edges: self.store.get_edges(model_id).await?,
            outcomes: Vec::new(),
            model,
        })
    }

    pub async fn list_models(&self) -> Result<Vec<DataModel>, CoreError> {
        Ok(self.store.list_models().await?)
    }

    /// Applies the change set for a model created earlier in the same
    /// request. A storage failure here must not strand the empty model
    /// record, so it is deleted again before the error propagates.
    async fn apply_or_discard(
        &self,
        model_id: ModelId,
        change: ModelChangeSet,
    ) -> Result<crate::traits::ApplyReport, CoreError> {
        match self.store.apply(model_id, change).await {
            Ok(report) => Ok(report),
            Err(error) => {
                warn!(model_id = %model_id, error = %error, "graph write failed, discarding model");
                if let Err(cleanup) = self.store.delete_model(model_id).await {
                    warn!(model_id = %model_id, error = %cleanup, "could not discard model");
                }
                Err(error.into())
            }
        }
    }

    async fn require_model(&self, model_id: ModelId) -> Result<DataModel, CoreError> {
        self.store
            .get_model(model_id)
            .await?
            .ok_or_else(|| CoreError::not_found("model", model_id))
    }

    /// Hub and Link components that will still exist after the request, in
    /// creation order. Candidates owned by nodes slated for deletion are
    /// skipped.
    async fn surviving_parents(
        &self,
        model_id: ModelId,
        surviving_nodes: &HashSet<NodeId>,
    ) -> Result<ParentCandidates, CoreError> {
        let mut parents = ParentCandidates::default();
        for hub in self
            .store
            .components_for_model(ComponentKind::Hub, model_id)
            .await?
        {
            if surviving_nodes.contains(&hub.node_id()) {
                parents.hubs.push(hub.id());
            }
        }
        for link in self
            .store
            .components_for_model(ComponentKind::Link, model_id)
            .await?
        {
            if surviving_nodes.contains(&link.node_id()) {
                parents.links.push(link.id());
            }
        }
        Ok(parents)
    }

    async fn finish(
        &self,
        model_id: ModelId,
        outcomes: Vec<NodeOutcome>,
        message: &str,
    ) -> Result<ModelGraph, CoreError> {
        for outcome in outcomes.iter().filter(|o| !o.is_synced()) {
            warn!(
                node_id = %outcome.node_id,
                kind = %outcome.kind,
                error = outcome.error.as_deref().unwrap_or_default(),
                "component left unsynchronized"
            );
        }
        let model = self.require_model(model_id).await?;
        let nodes = self.store.get_nodes(model_id).await?;
        let edges = self.store.get_edges(model_id).await?;
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            failed_components = outcomes.iter().filter(|o| !o.is_synced()).count(),
            "{message}"
        );
        Ok(ModelGraph {
            model,
            nodes,
            edges,
            outcomes,
        })
    }
}

/// Builds the stored node record for one payload entry, flat fields filled
/// from the extractor.
fn node_record(id: NodeId, model_id: ModelId, input: &NodeInput) -> (Node, ExtractedProperties) {
    let now = Utc::now();
    let mut node = Node {
        id,
        model_id,
        kind: input.kind,
        x: input.x,
        y: input.y,
        payload: input.payload.clone(),
        name: String::new(),
        table_name: String::new(),
        description: String::new(),
        created_at: now,
        updated_at: now,
    };
    let extracted = extractor::extract(&node);
    node.name = extracted.name.clone();
    node.table_name = extracted.table_name.clone();
    node.description = extracted.description.clone();
    (node, extracted)
}

fn edge_record(
    id: EdgeId,
    model_id: ModelId,
    source: NodeId,
    target: NodeId,
    payload: serde_json::Value,
) -> Edge {
    use crate::data::PayloadExt;
    let now = Utc::now();
    let name = payload.get_string("label");
    let description = payload.get_string("description");
    Edge {
        id,
        model_id,
        source,
        target,
        payload,
        name,
        description,
        created_at: now,
        updated_at: now,
    }
}

fn register_parent(parents: &mut ParentCandidates, component: &Component) {
    match component {
        Component::Hub(hub) => parents.hubs.push(hub.base.id),
        Component::Link(link) => parents.links.push(link.base.id),
        _ => {}
    }
}

/// Rejects malformed payload entries before any mutation happens. Edge
/// endpoints must name nodes in the payload itself: the payload is the full
/// desired node set, so a stored node absent from it is deleted by the same
/// request and cannot anchor a surviving edge.
fn validate_payload(payload: &GraphPayload) -> Result<(), CoreError> {
    let mut seen_nodes = HashSet::new();
    for input in &payload.nodes {
        if input.id.is_nil() {
            return Err(CoreError::malformed("node", "node id must not be nil"));
        }
        if !seen_nodes.insert(input.id) {
            return Err(CoreError::malformed(
                "node",
                format!("duplicate node id {}", input.id),
            ));
        }
    }
    let mut seen_edges = HashSet::new();
    for input in &payload.edges {
        if input.id.is_nil() {
            return Err(CoreError::malformed("edge", "edge id must not be nil"));
        }
        if !seen_edges.insert(input.id) {
            return Err(CoreError::malformed(
                "edge",
                format!("duplicate edge id {}", input.id),
            ));
        }
        for endpoint in [input.source, input.target] {
            if !seen_nodes.contains(&endpoint) {
                return Err(CoreError::malformed(
                    "edge",
                    format!("edge {} references unknown node {}", input.id, endpoint),
                ));
            }
        }
    }
    Ok(())
}
