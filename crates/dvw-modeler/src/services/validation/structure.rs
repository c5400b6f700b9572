//! Data Vault structural checks: required fields and the satellite parent
//! invariant.

use crate::data::{Hub, Link, Satellite, SatelliteKind, Severity};
use crate::services::validation::RuleFinding;

pub fn check_hub(hub: &Hub) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    if hub.business_keys.is_empty() {
        findings.push(RuleFinding::new(
            "business_keys",
            "Hub must have at least one business key",
        ));
    }
    if hub.hashkey_name.is_empty() {
        findings.push(RuleFinding::new(
            "hashkey_name",
            "Hub must have a hashkey name defined",
        ));
    }
    if hub.record_sources.is_empty() {
        findings.push(RuleFinding::new(
            "record_sources",
            "Hub must have at least one record source",
        ));
    }
    findings
}

/// The attributes rule for transactional links is convention rather than a
/// hard requirement, so its severity is caller-configurable.
pub fn check_link(link: &Link, transactional_attributes: Severity) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    if link.hashkey_name.is_empty() {
        findings.push(RuleFinding::new(
            "hashkey_name",
            "Link must have a hashkey name defined",
        ));
    }
    if link.is_transactional && link.attributes.is_empty() {
        findings.push(
            RuleFinding::new("attributes", "Transactional link should have attributes defined")
                .with_severity(transactional_attributes),
        );
    }
    findings
}

pub fn check_satellite(satellite: &Satellite) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    match (satellite.parent_hub, satellite.parent_link) {
        (None, None) => findings.push(RuleFinding::new(
            "parent",
            "Satellite must be connected to exactly one Hub or Link",
        )),
        (Some(_), Some(_)) => findings.push(RuleFinding::new(
            "parent",
            "Satellite cannot be connected to both Hub and Link",
        )),
        _ => {}
    }
    if satellite.hashdiff_name.is_empty() {
        findings.push(RuleFinding::new(
            "hashdiff_name",
            "Satellite must have a hashdiff name defined",
        ));
    }
    if satellite.satellite_type == SatelliteKind::MultiActive
        && satellite.multi_active_key.is_empty()
    {
        findings.push(RuleFinding::new(
            "multi_active_key",
            "Multi-active satellite must have a multi-active key defined",
        ));
    }
    if satellite.satellite_type == SatelliteKind::Effectivity {
        if satellite.effective_from_column.is_empty() {
            findings.push(RuleFinding::new(
                "effective_from_column",
                "Effectivity satellite must have effective from column defined",
            ));
        }
        if satellite.effective_to_column.is_empty() {
            findings.push(RuleFinding::new(
                "effective_to_column",
                "Effectivity satellite must have effective to column defined",
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ComponentBase, ComponentId, ModelId, NodeId};

    fn base() -> ComponentBase {
        ComponentBase::new(ModelId::new_v4(), NodeId::new_v4())
    }

    fn satellite(kind: SatelliteKind) -> Satellite {
        Satellite {
            base: base(),
            satellite_type: kind,
            hashdiff_name: "hd_x_s".to_string(),
            record_source: String::new(),
            parent_hub: Some(ComponentId::new_v4()),
            parent_link: None,
            attributes: vec![],
            contains_pii: false,
            multi_active_key: String::new(),
            effective_from_column: String::new(),
            effective_to_column: String::new(),
            is_deleted_column: String::new(),
        }
    }

    #[test]
    fn test_empty_hub_yields_three_findings() {
        let hub = Hub {
            base: base(),
            business_keys: vec![],
            hashkey_name: String::new(),
            record_sources: vec![],
        };
        let fields: Vec<&str> = check_hub(&hub).iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["business_keys", "hashkey_name", "record_sources"]);
    }

    #[test]
    fn test_satellite_parent_xor() {
        let mut sat = satellite(SatelliteKind::Standard);
        assert!(check_satellite(&sat).is_empty());

        sat.parent_link = Some(ComponentId::new_v4());
        let findings = check_satellite(&sat);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "parent");
        assert_eq!(
            findings[0].message,
            "Satellite cannot be connected to both Hub and Link"
        );

        sat.parent_hub = None;
        sat.parent_link = None;
        let findings = check_satellite(&sat);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Satellite must be connected to exactly one Hub or Link"
        );
    }

    #[test]
    fn test_multi_active_requires_key() {
        let sat = satellite(SatelliteKind::MultiActive);
        let findings = check_satellite(&sat);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "multi_active_key");
    }

    #[test]
    fn test_effectivity_requires_both_date_columns() {
        let mut sat = satellite(SatelliteKind::Effectivity);
        let fields: Vec<&str> = check_satellite(&sat).iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["effective_from_column", "effective_to_column"]);

        sat.effective_from_column = "eff_from".to_string();
        let fields: Vec<&str> = check_satellite(&sat).iter().map(|f| f.field).collect();
        assert_eq!(fields, vec!["effective_to_column"]);
    }

    #[test]
    fn test_transactional_link_severity_is_configurable() {
        let link = Link {
            base: base(),
            hashkey_name: "hk_order_l".to_string(),
            dependent_child_key: String::new(),
            record_sources: vec![],
            is_transactional: true,
            attributes: vec![],
        };
        let findings = check_link(&link, Severity::Warning);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);

        let findings = check_link(&link, Severity::Error);
        assert_eq!(findings[0].severity, Severity::Error);
    }
}
