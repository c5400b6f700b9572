//! Shared fixtures for unit and integration tests.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::data::{EdgeId, NodeId, NodeKind};
use crate::services::{EdgeInput, NodeInput, ReconcileService, ValidationService};
use crate::storage::MemoryStore;

/// A fresh in-memory store with both engine services attached to it.
pub fn services() -> (Arc<MemoryStore>, ReconcileService, ValidationService) {
    let store = Arc::new(MemoryStore::new());
    let reconcile = ReconcileService::new(store.clone());
    let validation = ValidationService::new(store.clone());
    (store, reconcile, validation)
}

pub fn node_input(kind: NodeKind, payload: Value) -> NodeInput {
    NodeInput {
        id: NodeId::new_v4(),
        kind,
        x: 0.0,
        y: 0.0,
        payload,
    }
}

/// A Hub node that passes every naming and structure rule.
pub fn valid_hub(label: &str) -> NodeInput {
    let slug = label.to_lowercase();
    node_input(
        NodeKind::Hub,
        json!({
            "label": label,
            "properties": {
                "tableName": format!("hub_{slug}_h"),
                "hashkeyName": format!("hk_{slug}_h"),
                "businessKeys": [format!("{slug}_number")],
                "recordSources": ["crm"]
            }
        }),
    )
}

/// A Link node that passes every naming and structure rule.
pub fn valid_link(label: &str) -> NodeInput {
    let slug = label.to_lowercase();
    node_input(
        NodeKind::Link,
        json!({
            "label": label,
            "properties": {
                "tableName": format!("link_{slug}_l"),
                "hashkeyName": format!("hk_{slug}_l"),
                "recordSources": ["crm"]
            }
        }),
    )
}

/// A standard Satellite node; the parent is left to auto-assignment.
pub fn valid_satellite(label: &str) -> NodeInput {
    let slug = label.to_lowercase();
    node_input(
        NodeKind::Satellite,
        json!({
            "label": label,
            "properties": {
                "tableName": format!("sat_{slug}_s"),
                "hashdiffName": format!("hd_{slug}_s"),
                "satelliteType": "standard",
                "recordSource": "crm"
            }
        }),
    )
}

pub fn edge_between(source: &NodeInput, target: &NodeInput) -> EdgeInput {
    EdgeInput {
        id: EdgeId::new_v4(),
        source: source.id,
        target: target.id,
        payload: json!({}),
    }
}
