use crate::client::Client;
use crate::Result;
use cloudant_core::ClusterInfo;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

impl Client {
    /// Server version and build information from the account root
    pub async fn cluster_info(&self) -> Result<ClusterInfo> {
        let response = self.execute(Method::GET, "/", HeaderMap::new(), None).await;
        self.mediate(response, StatusCode::OK).await
    }
}
