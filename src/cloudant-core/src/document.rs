use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity and revision carried by every stored document.
///
/// Flatten it into a document type to pick up the `_id`/`_rev` fields:
///
/// ```
/// use cloudant_core::{Document, DocumentMeta};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Automobile {
///     #[serde(flatten)]
///     meta: DocumentMeta,
///     year: i32,
/// }
///
/// impl Document for Automobile {
///     fn meta(&self) -> &DocumentMeta {
///         &self.meta
///     }
///     fn meta_mut(&mut self) -> &mut DocumentMeta {
///         &mut self.meta
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

impl DocumentMeta {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            rev: None,
        }
    }
}

/// Capability required of documents that are updated in place.
///
/// The service assigns an id when a document is created without one, and
/// bumps the revision on every write. Updates and deletes must present the
/// current revision.
pub trait Document {
    fn meta(&self) -> &DocumentMeta;
    fn meta_mut(&mut self) -> &mut DocumentMeta;

    fn id(&self) -> Option<&str> {
        self.meta().id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.meta_mut().id = Some(id);
    }

    fn revision(&self) -> Option<&str> {
        self.meta().rev.as_deref()
    }

    fn set_revision(&mut self, rev: String) {
        self.meta_mut().rev = Some(rev);
    }
}

impl Document for DocumentMeta {
    fn meta(&self) -> &DocumentMeta {
        self
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        self
    }
}

/// Schemaless document: identity plus arbitrary fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            meta: DocumentMeta::with_id(id),
            fields: Map::new(),
        }
    }

    /// Set a field, returning the document for chaining
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Document for RawDocument {
    fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut DocumentMeta {
        &mut self.meta
    }
}

/// Envelope returned by every write: database, document and index operations.
///
/// `result` is only set by index creation (`created` or `exists`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
}
