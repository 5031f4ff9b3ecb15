//! Cloudant Client Library
//!
//! HTTP client for the Cloudant / CouchDB document database API.
//!
//! ```rust,no_run
//! use cloudant::{Client, Query};
//! use cloudant_core::RawDocument;
//!
//! # async fn run() -> cloudant::Result<()> {
//! let client = Client::new("https://account.cloudant.com", "key", "password")?;
//! let db = client.database("automobiles");
//!
//! let mut query = Query::new();
//! query.selector("Model", "Diablo").sort("Year", true);
//! let cars: Vec<RawDocument> = db.query(&query).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod cluster;
mod database;
mod design_document;
mod document;
mod index;
mod query;

pub use client::Client;
pub use database::Database;
pub use cloudant_core::{
    ClientConfig, CloudantError, ClusterInfo, DesignDocument, Document, DocumentMeta,
    DocumentResponse, Index, IndexOptions, Query, RawDocument, SortDirection,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP exchange did not complete (DNS, connect, timeout, bad URL)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request body could not be encoded; nothing was sent
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service answered with an unexpected status, or a client-side lookup found nothing
    #[error(transparent)]
    Service(#[from] CloudantError),

    /// The service answered with the expected status but the body did not fit the target type
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Document is missing its {0}")]
    MissingIdentity(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl ClientError {
    /// The structured service error, if this is one
    pub fn as_service(&self) -> Option<&CloudantError> {
        match self {
            ClientError::Service(e) => Some(e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.as_service().map(|e| e.status_code)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
