use crate::database::{encode, encode_id, Database};
use crate::Result;
use cloudant_core::{
    CloudantError, CreateIndexRequest, DesignDocument, DocumentResponse, Index, IndexList,
    IndexOptions,
};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

/// Index management.
///
/// Index creation and deletion are eventually consistent: a listing made
/// right after either call may not reflect it yet. Callers that need the
/// index immediately must wait or retry on their side.
impl Database<'_> {
    /// Create a JSON index over `fields`, in the given order.
    ///
    /// Re-creating an identical index is not an error; the response's
    /// `result` is `exists` instead of `created`.
    pub async fn create_index<S: AsRef<str>>(
        &self,
        fields: &[S],
        options: &IndexOptions,
    ) -> Result<DocumentResponse> {
        let request = CreateIndexRequest::new(fields, options);
        let body = serde_json::to_vec(&request)?;

        let client = self.client();
        let response = client
            .execute(Method::POST, &self.path("_index"), HeaderMap::new(), Some(body))
            .await;
        let cdr: DocumentResponse = client.mediate(response, StatusCode::OK).await?;

        tracing::debug!(db = %self.name(), id = %cdr.id, result = %cdr.result, "Index created");
        Ok(cdr)
    }

    /// All indexes of the database, including the built-in `_all_docs` one
    pub async fn indices(&self) -> Result<Vec<Index>> {
        let client = self.client();
        let response = client
            .execute(Method::GET, &self.path("_index"), HeaderMap::new(), None)
            .await;
        let list: IndexList = client.mediate(response, StatusCode::OK).await?;
        Ok(list.indexes)
    }

    /// Find an index by name.
    ///
    /// The service has no such lookup, so this scans [`Database::indices`]
    /// and returns [`CloudantError::not_found`] when nothing matches.
    pub async fn index_by_name(&self, name: &str) -> Result<Index> {
        self.indices()
            .await?
            .into_iter()
            .find(|idx| idx.name == name)
            .ok_or_else(|| CloudantError::not_found().into())
    }

    /// Design document backing an index
    pub async fn index_design_document(&self, ddoc_name: &str) -> Result<DesignDocument> {
        self.get_design_document(ddoc_name).await
    }

    pub async fn delete_index_by_name(&self, name: &str) -> Result<DocumentResponse> {
        let index = self.index_by_name(name).await?;
        // _all_docs has no design document and cannot be deleted
        let ddoc = index.ddoc.ok_or_else(CloudantError::not_found)?;

        let uri = self.path(&format!(
            "_index/{}/{}/{}",
            encode_id(&ddoc),
            encode(&index.index_type),
            encode(name)
        ));

        let client = self.client();
        let response = client
            .execute(Method::DELETE, &uri, HeaderMap::new(), None)
            .await;
        client.mediate(response, StatusCode::OK).await
    }
}
