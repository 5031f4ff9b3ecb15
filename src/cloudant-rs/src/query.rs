use crate::database::Database;
use crate::{ClientError, Result};
use cloudant_core::Query;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

/// Envelope of a `_find` response. Only `docs` is kept, unparsed, because
/// its element shape belongs to the caller.
#[derive(Deserialize)]
struct QueryResults {
    docs: Box<RawValue>,
}

impl Database<'_> {
    /// Run a query against `/{db}/_find` and decode the matching documents into `T`,
    /// typically a `Vec` of the caller's document type.
    pub async fn query<T: DeserializeOwned>(&self, query: &Query) -> Result<T> {
        let body = serde_json::to_vec(query)?;

        let client = self.client();
        let response = client
            .execute(Method::POST, &self.path("_find"), HeaderMap::new(), Some(body))
            .await;
        let body = client.mediate_body(response, StatusCode::OK).await?;

        let results: QueryResults = serde_json::from_slice(&body).map_err(ClientError::Decode)?;
        serde_json::from_str(results.docs.get()).map_err(ClientError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudant_core::RawDocument;

    #[test]
    fn test_docs_fragment_decodes_into_caller_shape() {
        let body = br#"{"docs":[{"_id":"a","Model":"Diablo"}],"bookmark":"g1","warning":"no matching index"}"#;

        let results: QueryResults = serde_json::from_slice(body).unwrap();
        let docs: Vec<RawDocument> = serde_json::from_str(results.docs.get()).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].meta.id.as_deref(), Some("a"));
        assert_eq!(docs[0].get("Model").and_then(|v| v.as_str()), Some("Diablo"));
    }

    #[test]
    fn test_missing_docs_is_an_error() {
        assert!(serde_json::from_slice::<QueryResults>(br#"{"bookmark":"nil"}"#).is_err());
    }
}
