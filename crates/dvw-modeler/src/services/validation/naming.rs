//! Data Vault naming convention checks.
//!
//! Every rule fires only when the checked field is non-empty; blank fields
//! are a structural concern, not a naming one. The hash-key and hash-diff
//! rules accept the prefix or the suffix alone and complain only when a
//! name carries neither.

use crate::data::{Hub, Link, Satellite};
use crate::services::validation::RuleFinding;

fn is_valid_hub_table(name: &str) -> bool {
    (name.starts_with("hub_") && name.ends_with("_h")) || name.starts_with("h_")
}

fn is_valid_link_table(name: &str) -> bool {
    (name.starts_with("link_") && name.ends_with("_l")) || name.starts_with("l_")
}

pub fn check_hub(hub: &Hub) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    if !hub.base.table_name.is_empty() && !is_valid_hub_table(&hub.base.table_name) {
        findings.push(RuleFinding::new(
            "table_name",
            format!(
                "Hub table name '{}' should follow pattern 'hub_<name>_h' or 'h_<name>'",
                hub.base.table_name
            ),
        ));
    }
    if !hub.hashkey_name.is_empty()
        && !hub.hashkey_name.starts_with("hk_")
        && !hub.hashkey_name.ends_with("_h")
    {
        findings.push(RuleFinding::new(
            "hashkey_name",
            format!(
                "Hub hashkey '{}' should follow pattern 'hk_<name>_h'",
                hub.hashkey_name
            ),
        ));
    }
    findings
}

pub fn check_link(link: &Link) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    if !link.base.table_name.is_empty() && !is_valid_link_table(&link.base.table_name) {
        findings.push(RuleFinding::new(
            "table_name",
            format!(
                "Link table name '{}' should follow pattern 'link_<name>_l' or 'l_<name>'",
                link.base.table_name
            ),
        ));
    }
    if !link.hashkey_name.is_empty()
        && !link.hashkey_name.starts_with("hk_")
        && !link.hashkey_name.ends_with("_l")
    {
        findings.push(RuleFinding::new(
            "hashkey_name",
            format!(
                "Link hashkey '{}' should follow pattern 'hk_<name>_l'",
                link.hashkey_name
            ),
        ));
    }
    findings
}

pub fn check_satellite(satellite: &Satellite) -> Vec<RuleFinding> {
    let mut findings = Vec::new();
    if !satellite.base.table_name.is_empty() {
        let suffix = satellite.satellite_type.table_suffix();
        if !satellite.base.table_name.ends_with(suffix) {
            findings.push(RuleFinding::new(
                "table_name",
                format!(
                    "Satellite table name '{}' should end with '{}' for {} type",
                    satellite.base.table_name, suffix, satellite.satellite_type
                ),
            ));
        }
    }
    if !satellite.hashdiff_name.is_empty()
        && !satellite.hashdiff_name.starts_with("hd_")
        && !satellite.hashdiff_name.ends_with("_s")
    {
        findings.push(RuleFinding::new(
            "hashdiff_name",
            format!(
                "Satellite hashdiff '{}' should follow pattern 'hd_<name>_s'",
                satellite.hashdiff_name
            ),
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ComponentBase, ModelId, NodeId, SatelliteKind};

    fn base(table_name: &str) -> ComponentBase {
        let mut base = ComponentBase::new(ModelId::new_v4(), NodeId::new_v4());
        base.table_name = table_name.to_string();
        base
    }

    fn hub(table_name: &str, hashkey: &str) -> Hub {
        Hub {
            base: base(table_name),
            business_keys: vec![],
            hashkey_name: hashkey.to_string(),
            record_sources: vec![],
        }
    }

    fn satellite(table_name: &str, kind: SatelliteKind, hashdiff: &str) -> Satellite {
        Satellite {
            base: base(table_name),
            satellite_type: kind,
            hashdiff_name: hashdiff.to_string(),
            record_source: String::new(),
            parent_hub: None,
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
    fn test_hub_table_patterns() {
        assert!(check_hub(&hub("hub_customer_h", "")).is_empty());
        assert!(check_hub(&hub("h_customer", "")).is_empty());
        let findings = check_hub(&hub("customers", ""));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "table_name");
    }

    #[test]
    fn test_empty_fields_are_not_naming_findings() {
        assert!(check_hub(&hub("", "")).is_empty());
        assert!(check_satellite(&satellite("", SatelliteKind::Standard, "")).is_empty());
    }

    #[test]
    fn test_hashkey_prefix_or_suffix_suffices() {
        assert!(check_hub(&hub("", "hk_customer")).is_empty());
        assert!(check_hub(&hub("", "customer_h")).is_empty());
        let findings = check_hub(&hub("", "customer_key"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "hashkey_name");
    }

    #[test]
    fn test_satellite_suffix_follows_subtype() {
        assert!(
            check_satellite(&satellite("sat_customer_mas", SatelliteKind::MultiActive, ""))
                .is_empty()
        );
        let findings = check_satellite(&satellite("sat_customer_s", SatelliteKind::MultiActive, ""));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'_mas'"));
        assert!(findings[0].message.contains("multi-active type"));
    }

    #[test]
    fn test_link_rules() {
        let link = Link {
            base: base("tbl_orders"),
            hashkey_name: "order_key".to_string(),
            dependent_child_key: String::new(),
            record_sources: vec![],
            is_transactional: false,
            attributes: vec![],
        };
        let findings = check_link(&link);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].field, "table_name");
        assert_eq!(findings[1].field, "hashkey_name");
    }
}
