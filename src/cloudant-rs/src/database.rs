use crate::client::Client;
use crate::Result;
use cloudant_core::DocumentResponse;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::form_urlencoded;

/// Id prefixes whose `/` is part of the resource path
const PATH_PREFIXES: [&str; 2] = ["_design/", "_local/"];

/// Percent-encode a path segment or query value
pub(crate) fn encode(value: &str) -> String {
    // Form encoding writes spaces as `+`; a literal `+` is already `%2B`
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Encode a document id, keeping the `/` of design and local document ids
pub(crate) fn encode_id(id: &str) -> String {
    for prefix in PATH_PREFIXES {
        if let Some(name) = id.strip_prefix(prefix) {
            return format!("{}{}", prefix, encode(name));
        }
    }
    encode(id)
}

/// A named database on a [`Client`].
///
/// Purely a scoping value: it borrows the client, so any number of handles
/// can share one connection pool.
#[derive(Debug, Clone)]
pub struct Database<'a> {
    name: String,
    client: &'a Client,
}

impl<'a> Database<'a> {
    pub fn new(name: impl Into<String>, client: &'a Client) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Path of a resource inside this database, e.g. `/{db}/_index`.
    /// `trailing` must already be encoded.
    pub(crate) fn path(&self, trailing: &str) -> String {
        if trailing.is_empty() {
            format!("/{}", encode(&self.name))
        } else {
            format!("/{}/{}", encode(&self.name), trailing)
        }
    }

    /// Path of a document, with the id encoded
    pub(crate) fn document_path(&self, id: &str) -> String {
        self.path(&encode_id(id))
    }
}

impl Client {
    /// List the names of all databases in the account
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let response = self
            .execute(Method::GET, "/_all_dbs", HeaderMap::new(), None)
            .await;
        self.mediate(response, StatusCode::OK).await
    }

    pub async fn create_database(&self, name: &str) -> Result<DocumentResponse> {
        tracing::info!(db = %name, "Creating database");
        let response = self
            .execute(Method::PUT, &format!("/{}", encode(name)), HeaderMap::new(), None)
            .await;
        self.mediate(response, StatusCode::CREATED).await
    }

    pub async fn delete_database(&self, name: &str) -> Result<DocumentResponse> {
        tracing::info!(db = %name, "Deleting database");
        let response = self
            .execute(Method::DELETE, &format!("/{}", encode(name)), HeaderMap::new(), None)
            .await;
        self.mediate(response, StatusCode::OK).await
    }
}
