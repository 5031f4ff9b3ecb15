use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for a Cloudant account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Account root, e.g. `https://account.cloudant.com`
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whole request, from connect until the body is read
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Idle time allowed between reads of the response
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Echo raw response bodies to the log before decoding
    #[serde(default)]
    pub print_responses: bool,
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_response_timeout_ms() -> u64 {
    5000
}

impl ClientConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Read `CLOUDANT_URL`, `CLOUDANT_API_KEY` and `CLOUDANT_API_PASSWORD`
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("CLOUDANT_URL")
            .map_err(|_| anyhow::anyhow!("CLOUDANT_URL is not set"))?;
        let username = std::env::var("CLOUDANT_API_KEY").unwrap_or_default();
        let password = std::env::var("CLOUDANT_API_PASSWORD").unwrap_or_default();
        Ok(Self::new(url, username, password))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5984".to_string(),
            username: String::new(),
            password: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            print_responses: false,
        }
    }
}
