use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The only index type the query endpoint currently builds
pub const INDEX_TYPE_JSON: &str = "json";

/// Index description as listed by `GET /{db}/_index`.
///
/// `ddoc` is `None` only for the built-in `_all_docs` index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub ddoc: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(rename = "def")]
    pub definition: IndexDefinition,
}

/// Indexed fields in the order they were declared.
///
/// Each entry maps a field to `asc`/`desc` for json indexes, or to a value
/// type such as `number` for text indexes. Keys other than `fields` are kept
/// as they were listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    #[serde(default)]
    pub fields: Vec<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl IndexDefinition {
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|f| {
                    let mut entry = BTreeMap::new();
                    entry.insert(f.as_ref().to_string(), "asc".to_string());
                    entry
                })
                .collect(),
            options: Map::new(),
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flat_map(|entry| entry.keys().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub total_rows: usize,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// Optional names for a new index; the service generates any left unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub index_name: Option<String>,
    pub design_document_name: Option<String>,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn design_document_name(mut self, name: impl Into<String>) -> Self {
        self.design_document_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFields {
    pub fields: Vec<String>,
}

/// Body of `POST /{db}/_index`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    pub index: IndexFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddoc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
}

impl CreateIndexRequest {
    pub fn new<S: AsRef<str>>(fields: &[S], options: &IndexOptions) -> Self {
        Self {
            index: IndexFields {
                fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            },
            ddoc: options.design_document_name.clone(),
            name: options.index_name.clone(),
            index_type: None,
        }
    }
}
