//! Serialized module record emitted by the bundler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A compiled module: its export table and the externals it expects at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    /// Whether the module uses ES-module interop (`default` holds the main export).
    #[serde(default)]
    pub es_module: bool,

    /// Requests left unbundled, mapped to their runtime global name.
    #[serde(default)]
    pub externals: BTreeMap<String, String>,

    /// Export table.
    #[serde(default)]
    pub exports: BTreeMap<String, ExportDecl>,
}

/// One declared export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExportDecl {
    /// A template compiled into a component.
    Template { name: String, source: String },

    /// Re-export of a runtime module.
    External { request: String },

    /// A string constant.
    Text { value: String },

    /// A boolean constant.
    Flag { value: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let json = r#"{
            "esModule": true,
            "externals": { "kit": "kit" },
            "exports": {
                "default": { "kind": "template", "name": "document", "source": "<html></html>" },
                "amp": { "kind": "flag", "value": false }
            }
        }"#;

        let record: ModuleRecord = serde_json::from_str(json).unwrap();
        assert!(record.es_module);
        assert_eq!(record.externals.get("kit").map(String::as_str), Some("kit"));
        assert_eq!(
            record.exports.get("default"),
            Some(&ExportDecl::Template {
                name: "document".to_string(),
                source: "<html></html>".to_string(),
            })
        );
        assert_eq!(
            record.exports.get("amp"),
            Some(&ExportDecl::Flag { value: false })
        );
    }

    #[test]
    fn test_record_defaults() {
        let record: ModuleRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, ModuleRecord::default());
    }
}
