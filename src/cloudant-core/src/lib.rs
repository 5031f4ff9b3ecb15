//! Cloudant Core Library
//!
//! Wire-level types shared by the Cloudant client and the local emulator:
//! - Document identity/revision capability and the write-response envelope
//! - Index, design document and cluster descriptions
//! - Query selectors and sort specifications
//! - The service error model
//! - Client configuration

pub mod cluster;
pub mod config;
pub mod design;
pub mod document;
pub mod error;
pub mod index;
pub mod query;

// Re-export commonly used types
pub use cluster::ClusterInfo;
pub use config::ClientConfig;
pub use design::{DesignDocument, DesignDocumentView};
pub use document::{Document, DocumentMeta, DocumentResponse, RawDocument};
pub use error::CloudantError;
pub use index::{CreateIndexRequest, Index, IndexDefinition, IndexList, IndexOptions};
pub use query::{Query, SortDirection};
