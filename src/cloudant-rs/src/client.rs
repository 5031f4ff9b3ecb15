use crate::database::Database;
use crate::{ClientError, Result};
use cloudant_core::{ClientConfig, CloudantError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Cloudant REST API Client
///
/// Every request carries the account credentials as HTTP Basic auth and
/// declares that it accepts JSON. All higher level operations go through
/// [`Client::mediate`], which turns unexpected statuses into
/// [`CloudantError`]s and decodes everything else.
pub struct Client {
    base_url: String,
    username: String,
    password: String,
    client: HttpClient,
    print_responses: bool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("print_responses", &self.print_responses)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the given account root with default timeouts
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(&ClientConfig::new(base_url, username, password))
    }

    /// Create a client with explicit transport settings
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .read_timeout(config.response_timeout())
            .build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client,
            print_responses: config.print_responses,
        })
    }

    /// Create a client from `CLOUDANT_URL`, `CLOUDANT_API_KEY` and `CLOUDANT_API_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn print_responses(&self) -> bool {
        self.print_responses
    }

    /// Echo raw response bodies to the log before they are decoded
    pub fn set_print_responses(&mut self, enabled: bool) {
        self.print_responses = enabled;
    }

    /// Get a handle on a named database. No request is made.
    pub fn database(&self, name: impl Into<String>) -> Database<'_> {
        Database::new(name, self)
    }

    /// Build an authenticated request to `base_url + path`.
    ///
    /// `Accept: application/json` is added to every request and a JSON
    /// `Content-Type` to POST, PUT and PATCH, unless `headers` already
    /// carries them.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Request> {
        let url = format!("{}{}", self.base_url, path);

        headers
            .entry(ACCEPT)
            .or_insert(HeaderValue::from_static("application/json"));
        if method == Method::POST || method == Method::PUT || method == Method::PATCH {
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static("application/json"));
        }

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password))
            .headers(headers);

        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.build()?)
    }

    /// Send an authenticated request to `base_url + path`
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let request = self.build_request(method.clone(), path, headers, body)?;

        tracing::debug!(method = %method, path = %path, "Sending request");
        let response = self.client.execute(request).await?;
        tracing::debug!(method = %method, path = %path, status = %response.status(), "Received response");

        Ok(response)
    }

    /// Read the full body, echoing it when `print_responses` is set
    async fn read_body(&self, response: Response) -> Result<Vec<u8>> {
        let body = response.bytes().await?;

        if self.print_responses {
            tracing::info!(target: "cloudant_rs::response", "{}", String::from_utf8_lossy(&body));
        }

        Ok(body.to_vec())
    }

    /// Decode a response body into `T`
    pub async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let body = self.read_body(response).await?;
        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    /// Resolve the outcome of [`Client::execute`] into `T`.
    ///
    /// Transport errors pass through untouched. A status other than
    /// `expected` becomes a [`ClientError::Service`] built from the error
    /// body; a matching status is decoded, and a body that does not fit `T`
    /// is reported as [`ClientError::Decode`].
    pub async fn mediate<T: DeserializeOwned>(
        &self,
        result: Result<Response>,
        expected: StatusCode,
    ) -> Result<T> {
        let response = Self::check_status(result?, expected).await?;
        self.decode(response).await
    }

    /// Like [`Client::mediate`] but hands back the raw body
    pub(crate) async fn mediate_body(
        &self,
        result: Result<Response>,
        expected: StatusCode,
    ) -> Result<Vec<u8>> {
        let response = Self::check_status(result?, expected).await?;
        self.read_body(response).await
    }

    async fn check_status(response: Response, expected: StatusCode) -> Result<Response> {
        if response.status() == expected {
            return Ok(response);
        }

        let err = service_error(response).await;
        tracing::warn!(expected = %expected, "Unexpected response: {}", err);
        Err(err.into())
    }
}

/// Build the structured error for a response with an unexpected status
async fn service_error(response: Response) -> CloudantError {
    let status = response.status();

    match response.bytes().await {
        Ok(body) => CloudantError::from_body(status.as_u16(), status.to_string(), &body),
        Err(e) => CloudantError::unreadable(status.as_u16(), status.to_string(), e),
    }
}
