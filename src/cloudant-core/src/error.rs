use serde::{Deserialize, Serialize};

/// Status line carried by the client-side not-found error.
pub const NOT_FOUND_STATUS: &str = "(404) Not Found";

/// Error reported by the service, or synthesized for lookups the service lacks.
///
/// On the wire this is the `{"error": ..., "reason": ...}` body of a non-2xx
/// response; the HTTP status is merged in by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{status} ({status_code}): {code} {detail}")]
pub struct CloudantError {
    /// Status line of the HTTP exchange, e.g. `400 Bad Request`.
    #[serde(skip)]
    pub status: String,

    /// Numeric HTTP status.
    #[serde(skip)]
    pub status_code: u16,

    /// Service error id, e.g. `conflict` or `no_usable_index`.
    #[serde(rename = "error", default)]
    pub code: String,

    /// Service error reason.
    #[serde(rename = "reason", default)]
    pub detail: String,
}

impl CloudantError {
    pub fn new(
        status_code: u16,
        status: impl Into<String>,
        code: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            status_code,
            code: code.into(),
            detail: detail.into(),
        }
    }

    /// Build an error from the body of a response whose status was not the expected one.
    ///
    /// A body that is not a JSON error payload still yields an error, with the
    /// raw text and the parse failure as the detail.
    pub fn from_body(status_code: u16, status: impl Into<String>, body: &[u8]) -> Self {
        let status = status.into();
        match serde_json::from_slice::<CloudantError>(body) {
            Ok(parsed) => Self {
                status,
                status_code,
                ..parsed
            },
            Err(e) => Self {
                status,
                status_code,
                code: String::new(),
                detail: format!(
                    "Can not unmarshal JSON response '''{}''': {}",
                    String::from_utf8_lossy(body),
                    e
                ),
            },
        }
    }

    /// Build an error for a response whose body could not be read at all.
    pub fn unreadable(
        status_code: u16,
        status: impl Into<String>,
        err: impl std::fmt::Display,
    ) -> Self {
        Self {
            status: status.into(),
            status_code,
            code: String::new(),
            detail: format!("Can not read HTTP response: {}", err),
        }
    }

    /// Not-found error for lookups emulated on the client (e.g. index by name).
    pub fn not_found() -> Self {
        Self::new(404, NOT_FOUND_STATUS, "not_found", "missing")
    }

    /// True if this error was synthesized by the client rather than returned by the service.
    pub fn is_synthesized_not_found(&self) -> bool {
        self.status == NOT_FOUND_STATUS && self.status_code == 404
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code == 409
    }
}
