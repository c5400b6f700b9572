//! Kind-dispatched construction and update of typed components from
//! extracted node properties.

use serde_json::Value;

use crate::data::{
    Bridge, Component, ComponentBase, ComponentId, Hub, Link, Node, NodeKind, PayloadExt,
    PointInTime, Reference, ReferenceKind, Satellite, SatelliteKind,
};
use crate::services::extractor::ExtractedProperties;

/// Candidate parents for satellite auto-assignment, in creation order:
/// stored components first, then ones built earlier in the same request.
#[derive(Debug, Clone, Default)]
pub struct ParentCandidates {
    pub hubs: Vec<ComponentId>,
    pub links: Vec<ComponentId>,
}

impl ParentCandidates {
    /// First Hub, else first Link.
    fn fallback(&self) -> (Option<ComponentId>, Option<ComponentId>) {
        if let Some(hub) = self.hubs.first() {
            (Some(*hub), None)
        } else if let Some(link) = self.links.first() {
            (None, Some(*link))
        } else {
            (None, None)
        }
    }
}

fn apply_base(base: &mut ComponentBase, extracted: &ExtractedProperties) {
    base.name = extracted.name.clone();
    base.table_name = extracted.table_name.clone();
    base.description = extracted.description.clone();
    base.tags = extracted.tags.clone();
    base.position_x = extracted.position_x;
    base.position_y = extracted.position_y;
}

fn satellite_kind(props: &Value) -> SatelliteKind {
    props
        .get_str("satelliteType")
        .and_then(SatelliteKind::parse)
        .unwrap_or_default()
}

fn reference_kind(props: &Value) -> ReferenceKind {
    props
        .get_str("referenceType")
        .and_then(ReferenceKind::parse)
        .unwrap_or_default()
}

fn snapshot_date_column(props: &Value) -> String {
    let column = props.get_string("snapshotDateColumn");
    if column.is_empty() {
        "snapshot_date".to_string()
    } else {
        column
    }
}

/// Builds a fresh typed component for `node`. Satellites without an explicit
/// parent in the payload get the first available Hub, else the first Link.
pub fn build_component(
    node: &Node,
    extracted: &ExtractedProperties,
    parents: &ParentCandidates,
) -> Component {
    let mut base = ComponentBase::new(node.model_id, node.id);
    apply_base(&mut base, extracted);
    let props = &extracted.properties;

    match node.kind {
        NodeKind::Hub => Component::Hub(Hub {
            base,
            business_keys: props.get_string_list("businessKeys"),
            hashkey_name: props.get_string("hashkeyName"),
            record_sources: props.get_string_list("recordSources"),
        }),
        NodeKind::Link => Component::Link(Link {
            base,
            hashkey_name: props.get_string("hashkeyName"),
            dependent_child_key: props.get_string("dependentChildKey"),
            record_sources: props.get_string_list("recordSources"),
            is_transactional: props.get_bool("isTransactional"),
            attributes: props.get_string_list("attributes"),
        }),
        NodeKind::Satellite => {
            let mut parent_hub = props.get_uuid("parentHub").map(ComponentId);
            let mut parent_link = props.get_uuid("parentLink").map(ComponentId);
            if parent_hub.is_none() && parent_link.is_none() {
                (parent_hub, parent_link) = parents.fallback();
            }
            Component::Satellite(Satellite {
                base,
                satellite_type: satellite_kind(props),
                hashdiff_name: props.get_string("hashdiffName"),
                record_source: props.get_string("recordSource"),
                parent_hub,
                parent_link,
                attributes: props.get_string_list("attributes"),
                contains_pii: props.get_bool("containsPII"),
                multi_active_key: props.get_string("multiActiveKey"),
                effective_from_column: props.get_string("effectiveFromColumn"),
                effective_to_column: props.get_string("effectiveToColumn"),
                is_deleted_column: props.get_string("isDeletedColumn"),
            })
        }
        NodeKind::Reference => Component::Reference(Reference {
            base,
            reference_type: reference_kind(props),
            record_source: props.get_string("recordSource"),
            reference_keys: props.get_string_list("referenceKeys"),
            attributes: props.get_string_list("attributes"),
        }),
        NodeKind::PointInTime => Component::PointInTime(PointInTime {
            base,
            tracked_entity: props.get_uuid("trackedEntity").map(ComponentId),
            snapshot_date_column: snapshot_date_column(props),
            tracked_satellites: props.get_string_list("trackedSatellites"),
        }),
        NodeKind::Bridge => Component::Bridge(Bridge {
            base,
            bridge_entities: props.get_string_list("bridgeEntities"),
        }),
    }
}

/// Re-derives `existing` from the node's current payload, keeping its
/// identity and timestamps. Satellite parents are preserved unless the
/// payload names a replacement; a satellite still left parentless gets the
/// Hub-then-Link fallback.
pub fn update_component(
    existing: &Component,
    node: &Node,
    extracted: &ExtractedProperties,
    parents: &ParentCandidates,
) -> Component {
    let mut updated = build_component(node, extracted, parents);

    // Keep identity and lifecycle of the stored record.
    let existing_base = existing.base();
    let base = updated.base_mut();
    base.id = existing_base.id;
    base.created_at = existing_base.created_at;
    base.updated_at = existing_base.updated_at;

    if let (Component::Satellite(updated_sat), Component::Satellite(existing_sat)) =
        (&mut updated, existing)
    {
        let props = &extracted.properties;
        let payload_hub = props.get_uuid("parentHub").map(ComponentId);
        let payload_link = props.get_uuid("parentLink").map(ComponentId);
        if payload_hub.is_none() && payload_link.is_none() {
            updated_sat.parent_hub = existing_sat.parent_hub;
            updated_sat.parent_link = existing_sat.parent_link;
            if updated_sat.parent_hub.is_none() && updated_sat.parent_link.is_none() {
                (updated_sat.parent_hub, updated_sat.parent_link) = parents.fallback();
            }
        }
    }

    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ModelId, NodeId};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(kind: NodeKind, payload: Value) -> Node {
        let now = Utc::now();
        Node {
            id: NodeId::new_v4(),
            model_id: ModelId::new_v4(),
            kind,
            x: 10.0,
            y: 20.0,
            payload,
            name: String::new(),
            table_name: String::new(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn extracted(node: &Node) -> ExtractedProperties {
        crate::services::extractor::extract(node)
    }

    #[test]
    fn test_build_hub_reads_camel_case_keys() {
        let n = node(
            NodeKind::Hub,
            json!({
                "label": "Customer",
                "properties": {
                    "tableName": "hub_customer_h",
                    "businessKeys": ["customer_number"],
                    "hashkeyName": "hk_customer_h",
                    "recordSources": ["crm", "erp"]
                }
            }),
        );
        let component = build_component(&n, &extracted(&n), &ParentCandidates::default());
        let hub = component.as_hub().unwrap();
        assert_eq!(hub.base.name, "Customer");
        assert_eq!(hub.base.table_name, "hub_customer_h");
        assert_eq!(hub.business_keys, vec!["customer_number"]);
        assert_eq!(hub.hashkey_name, "hk_customer_h");
        assert_eq!(hub.record_sources, vec!["crm", "erp"]);
    }

    #[test]
    fn test_satellite_defaults_and_fallback_parent() {
        let n = node(NodeKind::Satellite, json!({ "label": "CustomerDetails" }));
        let hub_id = ComponentId::new_v4();
        let link_id = ComponentId::new_v4();
        let parents = ParentCandidates {
            hubs: vec![hub_id],
            links: vec![link_id],
        };
        let component = build_component(&n, &extracted(&n), &parents);
        let sat = component.as_satellite().unwrap();
        assert_eq!(sat.satellite_type, SatelliteKind::Standard);
        assert_eq!(sat.parent_hub, Some(hub_id));
        assert_eq!(sat.parent_link, None);
    }

    #[test]
    fn test_satellite_falls_back_to_link_without_hubs() {
        let n = node(NodeKind::Satellite, json!({ "label": "S" }));
        let link_id = ComponentId::new_v4();
        let parents = ParentCandidates {
            hubs: vec![],
            links: vec![link_id],
        };
        let component = build_component(&n, &extracted(&n), &parents);
        let sat = component.as_satellite().unwrap();
        assert_eq!(sat.parent_hub, None);
        assert_eq!(sat.parent_link, Some(link_id));
    }

    #[test]
    fn test_satellite_payload_parent_wins_over_fallback() {
        let explicit = ComponentId::new_v4();
        let n = node(
            NodeKind::Satellite,
            json!({
                "label": "S",
                "properties": { "parentLink": explicit.0.to_string() }
            }),
        );
        let parents = ParentCandidates {
            hubs: vec![ComponentId::new_v4()],
            links: vec![],
        };
        let component = build_component(&n, &extracted(&n), &parents);
        let sat = component.as_satellite().unwrap();
        assert_eq!(sat.parent_link, Some(explicit));
        assert_eq!(sat.parent_hub, None);
    }

    #[test]
    fn test_update_preserves_identity_and_parent() {
        let hub_id = ComponentId::new_v4();
        let mut n = node(
            NodeKind::Satellite,
            json!({ "label": "S", "properties": { "hashdiffName": "hd_s_s" } }),
        );
        let parents = ParentCandidates {
            hubs: vec![hub_id],
            links: vec![],
        };
        let original = build_component(&n, &extracted(&n), &parents);

        // Payload changes a field but says nothing about parents.
        n.payload = json!({ "label": "S", "properties": { "hashdiffName": "hd_s2_s" } });
        let updated = update_component(&original, &n, &extracted(&n), &ParentCandidates::default());

        assert_eq!(updated.id(), original.id());
        let sat = updated.as_satellite().unwrap();
        assert_eq!(sat.hashdiff_name, "hd_s2_s");
        assert_eq!(sat.parent_hub, Some(hub_id));
    }

    #[test]
    fn test_update_with_unchanged_payload_is_noop() {
        let n = node(
            NodeKind::Hub,
            json!({
                "label": "Customer",
                "properties": { "hashkeyName": "hk_customer_h", "businessKeys": ["id"] }
            }),
        );
        let original = build_component(&n, &extracted(&n), &ParentCandidates::default());
        let updated = update_component(&original, &n, &extracted(&n), &ParentCandidates::default());
        assert_eq!(original, updated);
    }

    #[test]
    fn test_pit_snapshot_date_default() {
        let n = node(NodeKind::PointInTime, json!({ "label": "CustomerPIT" }));
        let component = build_component(&n, &extracted(&n), &ParentCandidates::default());
        match component {
            Component::PointInTime(pit) => {
                assert_eq!(pit.snapshot_date_column, "snapshot_date");
                assert_eq!(pit.tracked_entity, None);
            }
            other => panic!("expected PIT, got {:?}", other.kind()),
        }
    }
}
