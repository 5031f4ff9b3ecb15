//! In-memory databases, documents and query indexes.
//!
//! Indexes live inside design documents (language `query`), exactly as the
//! service stores them, so listing indexes is a scan over design documents.

use cloudant_core::design::{
    design_id, DesignDocument, DesignDocumentView, ViewDefinition, ViewMap, ViewOptions,
    DESIGN_PREFIX,
};
use cloudant_core::index::INDEX_TYPE_JSON;
use cloudant_core::{
    CloudantError, CreateIndexRequest, DocumentMeta, Index, IndexDefinition, Query, SortDirection,
};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::selector;

pub type Result<T> = std::result::Result<T, CloudantError>;

/// Compute SHA256 hash of content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

fn error(status_code: u16, status: &str, code: &str, reason: &str) -> CloudantError {
    CloudantError::new(status_code, status, code, reason)
}

fn bad_request(reason: &str) -> CloudantError {
    error(400, "400 Bad Request", "bad_request", reason)
}

fn not_found(reason: &str) -> CloudantError {
    error(404, "404 Not Found", "not_found", reason)
}

fn conflict() -> CloudantError {
    error(409, "409 Conflict", "conflict", "Document update conflict.")
}

/// A document revision chain; only the latest body is kept
#[derive(Debug, Clone)]
struct StoredDoc {
    generation: u64,
    rev: String,
    body: Map<String, Value>,
    deleted: bool,
}

impl StoredDoc {
    fn to_json(&self, id: &str) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("_id".to_string(), Value::String(id.to_string()));
        doc.insert("_rev".to_string(), Value::String(self.rev.clone()));
        doc.extend(self.body.clone());
        doc
    }
}

/// Revision `N-<hash>`; N counts writes to the document
fn next_rev(generation: u64, body: &Map<String, Value>) -> String {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut seed = generation.to_be_bytes().to_vec();
    seed.extend_from_slice(&bytes);
    format!("{}-{}", generation, &hash_content(&seed)[..32])
}

#[derive(Debug, Default)]
struct DatabaseState {
    docs: BTreeMap<String, StoredDoc>,
}

/// Outcome of a document write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub id: String,
    pub rev: String,
}

/// Outcome of `POST /{db}/_index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCreated {
    /// `created` or `exists`
    pub result: &'static str,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Store {
    databases: BTreeMap<String, DatabaseState>,
}

/// Database names: lowercase letter first, then `a-z 0-9 _ $ ( ) + - /`
fn valid_db_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some('a'..='z'))
        && chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+-/".contains(c)
        })
}

fn split_meta(mut body: Map<String, Value>) -> (DocumentMeta, Map<String, Value>) {
    let id = match body.remove("_id") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };
    let rev = match body.remove("_rev") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };
    (DocumentMeta { id, rev }, body)
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_databases(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    pub fn create_database(&mut self, name: &str) -> Result<()> {
        if !valid_db_name(name) {
            return Err(error(
                400,
                "400 Bad Request",
                "illegal_database_name",
                &format!("Name: '{}'. Only lowercase characters (a-z), digits (0-9), and any of the characters _, $, (, ), +, -, and / are allowed. Must begin with a letter.", name),
            ));
        }
        if self.databases.contains_key(name) {
            return Err(error(
                412,
                "412 Precondition Failed",
                "file_exists",
                "The database could not be created, the file already exists.",
            ));
        }

        self.databases.insert(name.to_string(), DatabaseState::default());
        tracing::info!(db = %name, "Database created");
        Ok(())
    }

    pub fn delete_database(&mut self, name: &str) -> Result<()> {
        self.databases
            .remove(name)
            .map(|_| tracing::info!(db = %name, "Database deleted"))
            .ok_or_else(|| not_found("Database does not exist."))
    }

    fn db(&self, name: &str) -> Result<&DatabaseState> {
        self.databases
            .get(name)
            .ok_or_else(|| not_found("Database does not exist."))
    }

    fn db_mut(&mut self, name: &str) -> Result<&mut DatabaseState> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| not_found("Database does not exist."))
    }

    pub fn get_document(&self, db: &str, id: &str) -> Result<Map<String, Value>> {
        match self.db(db)?.docs.get(id) {
            Some(doc) if doc.deleted => Err(not_found("deleted")),
            Some(doc) => Ok(doc.to_json(id)),
            None => Err(not_found("missing")),
        }
    }

    /// Create a document, generating an id when the body has none
    pub fn create_document(&mut self, db: &str, body: Map<String, Value>) -> Result<WriteResult> {
        let (meta, body) = split_meta(body);
        let id = meta.id.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        self.write(db, &id, None, body)
    }

    /// Write a document at `id`. An existing document requires its current revision.
    pub fn put_document(
        &mut self,
        db: &str,
        id: &str,
        rev: Option<&str>,
        body: Map<String, Value>,
    ) -> Result<WriteResult> {
        let (meta, body) = split_meta(body);
        let rev = rev.map(str::to_string).or(meta.rev);
        self.write(db, id, rev.as_deref(), body)
    }

    fn write(
        &mut self,
        db: &str,
        id: &str,
        rev: Option<&str>,
        body: Map<String, Value>,
    ) -> Result<WriteResult> {
        if id.is_empty() {
            return Err(bad_request("Document id must not be empty"));
        }

        let state = self.db_mut(db)?;
        let generation = match state.docs.get(id) {
            Some(existing) if existing.deleted => {
                if rev.is_some_and(|r| r != existing.rev) {
                    return Err(conflict());
                }
                existing.generation + 1
            }
            Some(existing) => {
                if rev != Some(existing.rev.as_str()) {
                    return Err(conflict());
                }
                existing.generation + 1
            }
            None if rev.is_some() => return Err(conflict()),
            None => 1,
        };

        let rev = next_rev(generation, &body);
        state.docs.insert(
            id.to_string(),
            StoredDoc {
                generation,
                rev: rev.clone(),
                body,
                deleted: false,
            },
        );

        tracing::debug!(db = %db, id = %id, rev = %rev, "Document written");
        Ok(WriteResult {
            id: id.to_string(),
            rev,
        })
    }

    pub fn delete_document(&mut self, db: &str, id: &str, rev: Option<&str>) -> Result<WriteResult> {
        let state = self.db_mut(db)?;
        let doc = match state.docs.get_mut(id) {
            Some(doc) if !doc.deleted => doc,
            Some(_) => return Err(not_found("deleted")),
            None => return Err(not_found("missing")),
        };

        if rev != Some(doc.rev.as_str()) {
            return Err(conflict());
        }

        doc.generation += 1;
        doc.body = Map::new();
        doc.deleted = true;
        doc.rev = next_rev(doc.generation, &doc.body);

        tracing::debug!(db = %db, id = %id, rev = %doc.rev, "Document deleted");
        Ok(WriteResult {
            id: id.to_string(),
            rev: doc.rev.clone(),
        })
    }

    /// Live design documents holding query indexes
    fn query_design_docs(&self, db: &str) -> Result<Vec<DesignDocument>> {
        let state = self.db(db)?;
        let mut ddocs = Vec::new();

        for (id, doc) in state.docs.range(DESIGN_PREFIX.to_string()..) {
            if !id.starts_with(DESIGN_PREFIX) {
                break;
            }
            if doc.deleted {
                continue;
            }
            if let Ok(ddoc) = serde_json::from_value::<DesignDocument>(Value::Object(doc.to_json(id))) {
                if ddoc.language == "query" {
                    ddocs.push(ddoc);
                }
            }
        }

        Ok(ddocs)
    }

    /// All indexes, with the built-in `_all_docs` index first
    pub fn list_indexes(&self, db: &str) -> Result<Vec<Index>> {
        let mut indexes = vec![Index {
            ddoc: None,
            name: "_all_docs".to_string(),
            index_type: "special".to_string(),
            definition: IndexDefinition::from_fields(&["_id"]),
        }];

        for ddoc in self.query_design_docs(db)? {
            for (name, view) in &ddoc.views {
                indexes.push(Index {
                    ddoc: ddoc.meta.id.clone(),
                    name: name.clone(),
                    index_type: INDEX_TYPE_JSON.to_string(),
                    definition: IndexDefinition::from_fields(view.options.definition.fields.as_slice()),
                });
            }
        }

        Ok(indexes)
    }

    /// Create a JSON index; a generated name and design document are derived
    /// from the field list so repeating a request is idempotent.
    pub fn create_index(&mut self, db: &str, request: &CreateIndexRequest) -> Result<IndexCreated> {
        let fields = &request.index.fields;
        if fields.is_empty() {
            return Err(bad_request("Index fields must not be empty"));
        }
        if let Some(kind) = request.index_type.as_deref() {
            if kind != INDEX_TYPE_JSON {
                return Err(bad_request("Only json indexes are supported"));
            }
        }

        let digest = hash_content(fields.join("\u{0}").as_bytes());
        let name = request.name.clone().unwrap_or_else(|| digest[..40].to_string());
        let ddoc_id = design_id(request.ddoc.as_deref().unwrap_or(&digest[..40]));

        let view = DesignDocumentView {
            map: ViewMap {
                fields: fields
                    .iter()
                    .map(|f| (f.clone(), SortDirection::Asc))
                    .collect(),
            },
            reduce: "_count".to_string(),
            options: ViewOptions {
                definition: ViewDefinition {
                    fields: fields.clone(),
                },
                w: 2,
            },
        };

        let existing = match self.get_document(db, &ddoc_id) {
            Ok(doc) => Some(
                serde_json::from_value::<DesignDocument>(Value::Object(doc))
                    .map_err(|e| bad_request(&e.to_string()))?,
            ),
            Err(e) if e.status_code == 404 && self.db(db).is_ok() => None,
            Err(e) => return Err(e),
        };

        let mut ddoc = match existing {
            Some(ddoc) if ddoc.views.get(&name) == Some(&view) => {
                return Ok(IndexCreated {
                    result: "exists",
                    id: ddoc_id,
                    name,
                });
            }
            Some(ddoc) => ddoc,
            None => DesignDocument {
                meta: DocumentMeta::with_id(ddoc_id.clone()),
                language: "query".to_string(),
                views: BTreeMap::new(),
            },
        };

        ddoc.views.insert(name.clone(), view);
        let body = match serde_json::to_value(&ddoc) {
            Ok(Value::Object(body)) => body,
            _ => return Err(bad_request("Invalid design document")),
        };
        self.put_document(db, &ddoc_id, None, body)?;

        tracing::info!(db = %db, ddoc = %ddoc_id, index = %name, "Index created");
        Ok(IndexCreated {
            result: "created",
            id: ddoc_id,
            name,
        })
    }

    /// Remove one index; its design document goes away with its last index
    pub fn delete_index(&mut self, db: &str, ddoc: &str, index_type: &str, name: &str) -> Result<()> {
        let ddoc_id = design_id(ddoc);
        let missing = || not_found("Index not found");

        if index_type != INDEX_TYPE_JSON {
            return Err(missing());
        }

        let doc = self.get_document(db, &ddoc_id).map_err(|_| missing())?;
        let mut ddoc: DesignDocument =
            serde_json::from_value(Value::Object(doc)).map_err(|_| missing())?;
        if ddoc.language != "query" || ddoc.views.remove(name).is_none() {
            return Err(missing());
        }

        let rev = ddoc.meta.rev.clone();
        if ddoc.views.is_empty() {
            self.delete_document(db, &ddoc_id, rev.as_deref())?;
        } else {
            let body = match serde_json::to_value(&ddoc) {
                Ok(Value::Object(body)) => body,
                _ => return Err(bad_request("Invalid design document")),
            };
            self.put_document(db, &ddoc_id, rev.as_deref(), body)?;
        }

        tracing::info!(db = %db, ddoc = %ddoc_id, index = %name, "Index deleted");
        Ok(())
    }

    /// Run a `_find` query.
    ///
    /// Like the service, a selector must be covered by an index: at least one
    /// index's leading field has to appear in it.
    pub fn find(&self, db: &str, query: &Query) -> Result<Vec<Value>> {
        let indexes = self.list_indexes(db)?;
        let usable = indexes.iter().any(|idx| {
            idx.definition
                .field_names()
                .first()
                .is_some_and(|leading| query.selector.contains_key(*leading))
        });
        if !usable {
            return Err(error(
                400,
                "400 Bad Request",
                "no_usable_index",
                "There is no index available for this selector.",
            ));
        }

        let state = self.db(db)?;
        let mut docs: Vec<Map<String, Value>> = state
            .docs
            .iter()
            .filter(|(id, doc)| !doc.deleted && !id.starts_with(DESIGN_PREFIX))
            .map(|(id, doc)| doc.to_json(id))
            .filter(|doc| selector::matches(&query.selector, doc))
            .collect();

        let sort: Vec<(&str, SortDirection)> = query.sort_fields().collect();
        if !sort.is_empty() {
            docs.sort_by(|a, b| selector::compare_by(&sort, a, b));
        }

        Ok(docs
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .map(Value::Object)
            .collect())
    }
}
