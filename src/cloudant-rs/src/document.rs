use crate::database::{encode, Database};
use crate::{ClientError, Result};
use cloudant_core::{Document, DocumentResponse};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Status the service answers a document write with.
///
/// Batch writes are acknowledged before they are committed, with 202.
pub(crate) fn write_status(batch: bool) -> StatusCode {
    if batch {
        StatusCode::ACCEPTED
    } else {
        StatusCode::CREATED
    }
}

impl Database<'_> {
    /// Get a document by ID
    pub async fn get_document<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let client = self.client();
        let response = client
            .execute(Method::GET, &self.document_path(id), HeaderMap::new(), None)
            .await;
        client.mediate(response, StatusCode::OK).await
    }

    /// Create a document. The service assigns an id when the document has none.
    pub async fn create_document<T: Serialize + ?Sized>(
        &self,
        doc: &T,
        batch: bool,
    ) -> Result<DocumentResponse> {
        let body = serde_json::to_vec(doc)?;

        let mut uri = self.path("");
        if batch {
            uri.push_str("?batch=ok");
        }

        let client = self.client();
        let response = client
            .execute(Method::POST, &uri, HeaderMap::new(), Some(body))
            .await;
        client.mediate(response, write_status(batch)).await
    }

    /// Replace a document, using its current revision as the precondition.
    ///
    /// A stale revision is rejected by the service with a `409 conflict`.
    pub async fn update_document<T: Document + Serialize>(
        &self,
        doc: &T,
        batch: bool,
    ) -> Result<DocumentResponse> {
        let id = doc.id().ok_or(ClientError::MissingIdentity("_id"))?;
        let rev = doc.revision().ok_or(ClientError::MissingIdentity("_rev"))?;
        let body = serde_json::to_vec(doc)?;

        let mut uri = format!("{}?rev={}", self.document_path(id), encode(rev));
        if batch {
            uri.push_str("&batch=ok");
        }

        let client = self.client();
        let response = client
            .execute(Method::PUT, &uri, HeaderMap::new(), Some(body))
            .await;
        client.mediate(response, write_status(batch)).await
    }

    pub async fn delete_document(&self, id: &str, revision: &str) -> Result<DocumentResponse> {
        let uri = format!("{}?rev={}", self.document_path(id), encode(revision));

        let client = self.client();
        let response = client
            .execute(Method::DELETE, &uri, HeaderMap::new(), None)
            .await;
        client.mediate(response, StatusCode::OK).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Client;
    use cloudant_core::RawDocument;
    use std::collections::HashMap;

    #[test]
    fn test_write_status_per_mode() {
        assert_eq!(write_status(false), StatusCode::CREATED);
        assert_eq!(write_status(true), StatusCode::ACCEPTED);
    }

    // Port 9 (discard) is never contacted: both calls fail before any request is built.

    #[tokio::test]
    async fn test_create_rejects_unserializable_document() {
        let client = Client::new("http://127.0.0.1:9", "", "").unwrap();
        let db = client.database("autos");

        let mut invalid: HashMap<Vec<u8>, i32> = HashMap::new();
        invalid.insert(vec![6], 6);

        let err = db.create_document(&invalid, false).await.unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
        assert!(err.to_string().contains("key must be a string"));
    }

    #[tokio::test]
    async fn test_update_requires_identity() {
        let client = Client::new("http://127.0.0.1:9", "", "").unwrap();
        let db = client.database("autos");

        let doc = RawDocument::new().field("Year", 1960);
        let err = db.update_document(&doc, false).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingIdentity("_id")));

        let doc = RawDocument::with_id("car").field("Year", 1960);
        let err = db.update_document(&doc, false).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingIdentity("_rev")));
    }
}
