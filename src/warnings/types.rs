use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Severity;

/// Interpolation value for a message template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A clinical warning. The engine never renders text: `message_key` is
/// resolved by the caller's translation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningItem {
    pub severity: Severity,
    pub message_key: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

impl WarningItem {
    pub fn new(severity: Severity, message_key: &str) -> Self {
        Self {
            severity,
            message_key: message_key.to_string(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_serialize_untagged() {
        let warning = WarningItem::new(Severity::Danger, "warning.gfr.drug.avoid")
            .with_param("drug", "morphine")
            .with_param("dose", 450.0);
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"severity\":\"danger\""));
        assert!(json.contains("\"drug\":\"morphine\""));
        assert!(json.contains("\"dose\":450.0"));
    }

    #[test]
    fn empty_params_omitted() {
        let warning = WarningItem::new(Severity::Info, "patch.onset");
        let json = serde_json::to_string(&warning).unwrap();
        assert!(!json.contains("params"));
    }
}
