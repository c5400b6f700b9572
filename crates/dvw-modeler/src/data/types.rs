//! Basic types shared across the Data Vault modeler

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Node type tag carried by a generic graph node. The wire spellings match
/// what clients put in the `type` field (`LNK` rather than `LINK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "HUB")]
    Hub,
    #[serde(rename = "LNK")]
    Link,
    #[serde(rename = "SAT")]
    Satellite,
    #[serde(rename = "REF")]
    Reference,
    #[serde(rename = "PIT")]
    PointInTime,
    #[serde(rename = "BRIDGE")]
    Bridge,
}

impl NodeKind {
    /// Wire tag, also used for the name fallback of unlabeled nodes.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Hub => "HUB",
            NodeKind::Link => "LNK",
            NodeKind::Satellite => "SAT",
            NodeKind::Reference => "REF",
            NodeKind::PointInTime => "PIT",
            NodeKind::Bridge => "BRIDGE",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Satellite subtype governing which extra fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SatelliteKind {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "multi-active")]
    MultiActive,
    #[serde(rename = "effectivity")]
    Effectivity,
    #[serde(rename = "record-tracking")]
    RecordTracking,
    #[serde(rename = "non-historized")]
    NonHistorized,
}

impl Default for SatelliteKind {
    fn default() -> Self {
        SatelliteKind::Standard
    }
}

impl SatelliteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SatelliteKind::Standard => "standard",
            SatelliteKind::MultiActive => "multi-active",
            SatelliteKind::Effectivity => "effectivity",
            SatelliteKind::RecordTracking => "record-tracking",
            SatelliteKind::NonHistorized => "non-historized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(SatelliteKind::Standard),
            "multi-active" => Some(SatelliteKind::MultiActive),
            "effectivity" => Some(SatelliteKind::Effectivity),
            "record-tracking" => Some(SatelliteKind::RecordTracking),
            "non-historized" => Some(SatelliteKind::NonHistorized),
            _ => None,
        }
    }

    /// Table-name suffix required by the naming conventions.
    pub fn table_suffix(&self) -> &'static str {
        match self {
            SatelliteKind::Standard => "_s",
            SatelliteKind::MultiActive => "_mas",
            SatelliteKind::Effectivity => "_es",
            SatelliteKind::RecordTracking => "_rts",
            SatelliteKind::NonHistorized => "_nhs",
        }
    }
}

impl fmt::Display for SatelliteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference dataset subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "hub")]
    Hub,
    #[serde(rename = "satellite")]
    Satellite,
}

impl Default for ReferenceKind {
    fn default() -> Self {
        ReferenceKind::Table
    }
}

impl ReferenceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "table" => Some(ReferenceKind::Table),
            "hub" => Some(ReferenceKind::Hub),
            "satellite" => Some(ReferenceKind::Satellite),
            _ => None,
        }
    }
}

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Typed reads over a free-form JSON payload bag. Absent or mistyped keys
/// degrade to defaults, never error.
pub trait PayloadExt {
    fn get_str(&self, key: &str) -> Option<&str>;
    fn get_string(&self, key: &str) -> String;
    fn get_bool(&self, key: &str) -> bool;
    fn get_string_list(&self, key: &str) -> Vec<String>;
    fn get_uuid(&self, key: &str) -> Option<Uuid>;
}

impl PayloadExt for serde_json::Value {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(serde_json::Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    fn get_uuid(&self, key: &str) -> Option<Uuid> {
        self.get_str(key).and_then(|s| Uuid::parse_str(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind_wire_tags() {
        let kind: NodeKind = serde_json::from_str("\"LNK\"").unwrap();
        assert_eq!(kind, NodeKind::Link);
        assert_eq!(serde_json::to_string(&NodeKind::Bridge).unwrap(), "\"BRIDGE\"");
    }

    #[test]
    fn test_satellite_kind_suffixes() {
        assert_eq!(SatelliteKind::Standard.table_suffix(), "_s");
        assert_eq!(SatelliteKind::MultiActive.table_suffix(), "_mas");
        assert_eq!(SatelliteKind::Effectivity.table_suffix(), "_es");
        assert_eq!(SatelliteKind::RecordTracking.table_suffix(), "_rts");
        assert_eq!(SatelliteKind::NonHistorized.table_suffix(), "_nhs");
    }

    #[test]
    fn test_satellite_kind_parse_roundtrip() {
        for s in ["standard", "multi-active", "effectivity", "record-tracking", "non-historized"] {
            assert_eq!(SatelliteKind::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(SatelliteKind::parse("bogus"), None);
    }

    #[test]
    fn test_payload_ext_defaults() {
        let payload = json!({
            "label": "Customer",
            "isTransactional": true,
            "businessKeys": ["customer_number", 42],
            "parentHub": "not-a-uuid"
        });

        assert_eq!(payload.get_string("label"), "Customer");
        assert_eq!(payload.get_string("missing"), "");
        assert!(payload.get_bool("isTransactional"));
        assert!(!payload.get_bool("missing"));
        // Non-string array entries are skipped, not errors.
        assert_eq!(payload.get_string_list("businessKeys"), vec!["customer_number"]);
        assert_eq!(payload.get_uuid("parentHub"), None);
    }

    #[test]
    fn test_payload_ext_scalar_list_promotion() {
        let payload = json!({ "recordSources": "crm" });
        assert_eq!(payload.get_string_list("recordSources"), vec!["crm"]);
    }
}
