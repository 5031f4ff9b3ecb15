use crate::database::Database;
use crate::Result;
use cloudant_core::design::design_id;
use cloudant_core::DesignDocument;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

impl Database<'_> {
    /// Fetch a design document by name, with or without the `_design/` prefix
    pub async fn get_design_document(&self, id: &str) -> Result<DesignDocument> {
        let client = self.client();
        let response = client
            .execute(Method::GET, &self.document_path(&design_id(id)), HeaderMap::new(), None)
            .await;
        client.mediate(response, StatusCode::OK).await
    }
}
