use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::{Document, DocumentMeta};
use crate::query::SortDirection;

/// Prefix shared by all design document ids
pub const DESIGN_PREFIX: &str = "_design/";

/// Design document hosting index definitions.
///
/// Indexes created through `_index` are backed by a design document whose
/// language is `query` and which has one view per index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub views: BTreeMap<String, DesignDocumentView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignDocumentView {
    #[serde(default)]
    pub map: ViewMap,
    #[serde(default)]
    pub reduce: String,
    #[serde(default)]
    pub options: ViewOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewMap {
    #[serde(default)]
    pub fields: BTreeMap<String, SortDirection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(rename = "def", default)]
    pub definition: ViewDefinition,
    #[serde(default)]
    pub w: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    #[serde(default)]
    pub fields: Vec<String>,
}

impl DesignDocument {
    /// Names of the views hosted by this design document
    pub fn view_keys(&self) -> Vec<&str> {
        self.views.keys().map(String::as_str).collect()
    }
}

impl Document for DesignDocument {
    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

/// Full id of a design document, adding the `_design/` prefix when missing.
pub fn design_id(name: &str) -> String {
    if name.starts_with(DESIGN_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", DESIGN_PREFIX, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_design_id() {
        assert_eq!(design_id("idx"), "_design/idx");
        assert_eq!(design_id("_design/idx"), "_design/idx");
    }

    #[test]
    fn test_decode_query_design_document() {
        let ddoc: DesignDocument = serde_json::from_value(json!({
            "_id": "_design/idx_get_minute_second",
            "_rev": "1-abc",
            "language": "query",
            "views": {
                "idx_get_minute_second": {
                    "map": {"fields": {"GetMinute": "asc", "GetSecond": "asc"}},
                    "reduce": "_count",
                    "options": {"def": {"fields": ["GetMinute", "GetSecond"]}, "w": 2}
                }
            }
        }))
        .unwrap();

        assert_eq!(ddoc.id(), Some("_design/idx_get_minute_second"));
        assert_eq!(ddoc.language, "query");
        assert_eq!(ddoc.view_keys(), vec!["idx_get_minute_second"]);

        let view = &ddoc.views["idx_get_minute_second"];
        assert_eq!(view.reduce, "_count");
        assert_eq!(view.map.fields.len(), 2);
        assert_eq!(view.options.w, 2);
        assert_eq!(view.options.definition.fields, vec!["GetMinute", "GetSecond"]);
    }
}
