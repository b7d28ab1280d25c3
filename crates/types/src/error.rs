use thiserror::Error;

/// Failure of one fetch cycle.
///
/// Every variant renders to the single human-readable message that the
/// fetch controller stores in [`crate::FetchResult::error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The configuration cannot produce a request; raised before any network call.
    #[error("{0}")]
    InvalidConfig(String),
    /// The server answered with a non-2xx status.
    #[error("API Error: {status} {status_text}")]
    Http { status: u16, status_text: String },
    /// The response content type does not indicate JSON.
    #[error("API did not return JSON data")]
    NotJson { content_type: Option<String> },
    /// Transport failure (DNS, connect, TLS, timeout, body read).
    #[error("Network error: {0}")]
    Network(String),
    /// The body could not be parsed as JSON.
    #[error("Invalid JSON: {0}")]
    Parse(String),
}

impl FetchError {
    /// The canonical error for a URL that is missing a scheme or otherwise unparsable.
    pub fn invalid_url() -> Self {
        Self::InvalidConfig("Invalid API URL".to_string())
    }

    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        Self::Http {
            status,
            status_text: status_text.into(),
        }
    }
}
