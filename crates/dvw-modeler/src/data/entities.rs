//! Persisted record types for the Data Vault modeler
//!
//! A model owns generic graph nodes and edges; every node is mirrored by at
//! most one typed component of the matching kind. Components are a tagged
//! sum rather than a string-dispatched hierarchy so kind dispatch is a match,
//! not an if/elif chain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::identifiers::{ComponentId, EdgeId, ModelId, NodeId};
use crate::data::types::{NodeKind, ReferenceKind, SatelliteKind};

/// A data model: the diagram as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    pub id: ModelId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataModel {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ModelId::new_v4(),
            name: name.into(),
            description: String::new(),
            version: "1.0".to_string(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A generic graph node. `payload` is the client's free-form bag
/// (`label`, `properties.*`); the flat `name`/`table_name`/`description`
/// fields are kept in sync by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub model_id: ModelId,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub payload: serde_json::Value,
    pub name: String,
    pub table_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A graph edge. Edges have no typed-component mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub model_id: ModelId,
    pub source: NodeId,
    pub target: NodeId,
    pub payload: serde_json::Value,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields every typed component carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBase {
    pub id: ComponentId,
    pub model_id: ModelId,
    pub node_id: NodeId,
    pub name: String,
    pub table_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub position_x: f64,
    pub position_y: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComponentBase {
    pub fn new(model_id: ModelId, node_id: NodeId) -> Self {
        let now = Utc::now();
        Self {
            id: ComponentId::new_v4(),
            model_id,
            node_id,
            name: String::new(),
            table_name: String::new(),
            description: String::new(),
            tags: Vec::new(),
            position_x: 0.0,
            position_y: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Hub: a unique business key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub business_keys: Vec<String>,
    pub hashkey_name: String,
    pub record_sources: Vec<String>,
}

/// Link: a relationship between Hubs, optionally transactional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub hashkey_name: String,
    pub dependent_child_key: String,
    pub record_sources: Vec<String>,
    pub is_transactional: bool,
    pub attributes: Vec<String>,
}

/// Satellite: descriptive context for exactly one Hub or Link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub satellite_type: SatelliteKind,
    pub hashdiff_name: String,
    pub record_source: String,
    pub parent_hub: Option<ComponentId>,
    pub parent_link: Option<ComponentId>,
    pub attributes: Vec<String>,
    pub contains_pii: bool,
    pub multi_active_key: String,
    pub effective_from_column: String,
    pub effective_to_column: String,
    pub is_deleted_column: String,
}

/// Reference: auxiliary lookup dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub reference_type: ReferenceKind,
    pub record_source: String,
    pub reference_keys: Vec<String>,
    pub attributes: Vec<String>,
}

/// Point-in-Time: snapshots a tracked Hub's satellites as of given dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInTime {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub tracked_entity: Option<ComponentId>,
    pub snapshot_date_column: String,
    pub tracked_satellites: Vec<String>,
}

/// Bridge: pre-joined entities for query convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    #[serde(flatten)]
    pub base: ComponentBase,
    pub bridge_entities: Vec<String>,
}

/// Kind tag of a typed component, one-to-one with [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Hub,
    Link,
    Satellite,
    Reference,
    PointInTime,
    Bridge,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Hub,
        ComponentKind::Link,
        ComponentKind::Satellite,
        ComponentKind::Reference,
        ComponentKind::PointInTime,
        ComponentKind::Bridge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Hub => "hub",
            ComponentKind::Link => "link",
            ComponentKind::Satellite => "satellite",
            ComponentKind::Reference => "reference",
            ComponentKind::PointInTime => "point-in-time",
            ComponentKind::Bridge => "bridge",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<NodeKind> for ComponentKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Hub => ComponentKind::Hub,
            NodeKind::Link => ComponentKind::Link,
            NodeKind::Satellite => ComponentKind::Satellite,
            NodeKind::Reference => ComponentKind::Reference,
            NodeKind::PointInTime => ComponentKind::PointInTime,
            NodeKind::Bridge => ComponentKind::Bridge,
        }
    }
}

/// A typed component: one of the six Data Vault entity kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Component {
    Hub(Hub),
    Link(Link),
    Satellite(Satellite),
    Reference(Reference),
    PointInTime(PointInTime),
    Bridge(Bridge),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Hub(_) => ComponentKind::Hub,
            Component::Link(_) => ComponentKind::Link,
            Component::Satellite(_) => ComponentKind::Satellite,
            Component::Reference(_) => ComponentKind::Reference,
            Component::PointInTime(_) => ComponentKind::PointInTime,
            Component::Bridge(_) => ComponentKind::Bridge,
        }
    }

    pub fn base(&self) -> &ComponentBase {
        match self {
            Component::Hub(c) => &c.base,
            Component::Link(c) => &c.base,
            Component::Satellite(c) => &c.base,
            Component::Reference(c) => &c.base,
            Component::PointInTime(c) => &c.base,
            Component::Bridge(c) => &c.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ComponentBase {
        match self {
            Component::Hub(c) => &mut c.base,
            Component::Link(c) => &mut c.base,
            Component::Satellite(c) => &mut c.base,
            Component::Reference(c) => &mut c.base,
            Component::PointInTime(c) => &mut c.base,
            Component::Bridge(c) => &mut c.base,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.base().id
    }

    pub fn model_id(&self) -> ModelId {
        self.base().model_id
    }

    pub fn node_id(&self) -> NodeId {
        self.base().node_id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn as_hub(&self) -> Option<&Hub> {
        match self {
            Component::Hub(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self {
            Component::Link(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_satellite(&self) -> Option<&Satellite> {
        match self {
            Component::Satellite(c) => Some(c),
            _ => None,
        }
    }
}
