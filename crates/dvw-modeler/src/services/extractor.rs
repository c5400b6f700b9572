//! Property Extractor: normalizes a node's free-form payload into flat
//! typed fields.
//!
//! Extraction is pure and infallible: missing or malformed payload keys
//! degrade to per-field defaults, never errors. The kind-specific keys live
//! under `payload.properties` and keep the client's camelCase spellings.

use serde_json::Value;

use crate::data::{Node, PayloadExt};

/// Flat view of one node's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProperties {
    pub name: String,
    pub description: String,
    pub table_name: String,
    pub tags: Vec<String>,
    pub position_x: f64,
    pub position_y: f64,
    /// The raw `payload.properties` object; `{}` when absent.
    pub properties: Value,
}

/// Extracts the flat property view of `node`.
///
/// `name` is the trimmed `payload.label`; unlabeled nodes get
/// `"<TYPE> <first 8 chars of the node id>"` so they stay addressable.
pub fn extract(node: &Node) -> ExtractedProperties {
    let label = node
        .payload
        .get_str("label")
        .map(str::trim)
        .unwrap_or_default();
    let name = if label.is_empty() {
        let id = node.id.to_string();
        format!("{} {}", node.kind.as_str(), &id[..8])
    } else {
        label.to_string()
    };

    let properties = match node.payload.get("properties") {
        Some(value @ Value::Object(_)) => value.clone(),
        _ => Value::Object(serde_json::Map::new()),
    };

    ExtractedProperties {
        name,
        description: node.payload.get_string("description"),
        table_name: properties.get_string("tableName"),
        tags: node.payload.get_string_list("tags"),
        position_x: node.x,
        position_y: node.y,
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ModelId, NodeId, NodeKind};
    use chrono::Utc;
    use serde_json::json;

    fn node_with_payload(kind: NodeKind, payload: Value) -> Node {
        let now = Utc::now();
        Node {
            id: NodeId::new_v4(),
            model_id: ModelId::new_v4(),
            kind,
            x: 120.0,
            y: -40.5,
            payload,
            name: String::new(),
            table_name: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_extracts_label_and_table_name() {
        let node = node_with_payload(
            NodeKind::Hub,
            json!({
                "label": "  Customer  ",
                "description": "central customer hub",
                "tags": ["core"],
                "properties": { "tableName": "hub_customer_h" }
            }),
        );
        let extracted = extract(&node);
        assert_eq!(extracted.name, "Customer");
        assert_eq!(extracted.description, "central customer hub");
        assert_eq!(extracted.table_name, "hub_customer_h");
        assert_eq!(extracted.tags, vec!["core"]);
        assert_eq!(extracted.position_x, 120.0);
        assert_eq!(extracted.position_y, -40.5);
    }

    #[test]
    fn test_name_falls_back_to_kind_and_id_prefix() {
        let node = node_with_payload(NodeKind::Satellite, json!({}));
        let extracted = extract(&node);
        let expected = format!("SAT {}", &node.id.to_string()[..8]);
        assert_eq!(extracted.name, expected);
    }

    #[test]
    fn test_blank_label_falls_back() {
        let node = node_with_payload(NodeKind::Link, json!({ "label": "   " }));
        let extracted = extract(&node);
        assert!(extracted.name.starts_with("LNK "));
    }

    #[test]
    fn test_malformed_properties_degrade_to_defaults() {
        let node = node_with_payload(
            NodeKind::Hub,
            json!({ "label": "X", "properties": "not-an-object" }),
        );
        let extracted = extract(&node);
        assert_eq!(extracted.table_name, "");
        assert_eq!(extracted.properties, json!({}));
    }
}
