//! Resttable HTTP layer.
//!
//! This crate provides:
//!
//! - [`build_request`], which resolves an endpoint configuration into a GET
//!   request (URL, query string, headers);
//! - the [`HttpTransport`] seam the fetch pipeline executes requests through;
//! - [`RestClient`], the `reqwest`-backed transport used outside of tests.
//!
//! # Example
//!
//! ```ignore
//! use resttable_api::{HttpTransport, RestClient, build_request};
//! use resttable_types::EndpointConfig;
//!
//! async fn status() -> anyhow::Result<u16> {
//!     let client = RestClient::new()?;
//!     let request = build_request(&EndpointConfig::default())?;
//!     Ok(client.execute(request).await?.status)
//! }
//! ```

mod request;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use resttable_types::FetchError;
use resttable_util::redact_sensitive;
use tracing::{debug, warn};

pub use request::{HttpRequest, build_request};

/// Raw response handed back by a transport; interpretation (status, content
/// type, JSON) is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the declared content type says the body is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
    }
}

/// Executes resolved requests.
///
/// Only transport-level failures are errors here; non-2xx responses are
/// returned as ordinary [`HttpResponse`] values.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    user_agent: String,
}

impl RestClient {
    /// Build a client with a 30 second timeout and the crate user agent.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            user_agent: format!("resttable/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for RestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let start = Instant::now();
        let url = request.url.clone();
        debug!(
            method = %request.method,
            url = %redact_sensitive(&url),
            header_count = request.headers.len(),
            "http request started"
        );

        let response = self
            .http
            .request(request.method, &request.url)
            .header(header::USER_AGENT, &self.user_agent)
            .headers(request.headers)
            .send()
            .await
            .map_err(|error| {
                warn!(
                    url = %redact_sensitive(&url),
                    error = %error,
                    duration_ms = start.elapsed().as_millis(),
                    "http request failed"
                );
                FetchError::Network(error.without_url().to_string())
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|error| FetchError::Network(error.without_url().to_string()))?;

        debug!(
            url = %redact_sensitive(&url),
            status = %status,
            body_len = body.len(),
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status_text(status),
            content_type,
            body,
        })
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>) -> HttpResponse {
        HttpResponse {
            status,
            status_text: String::new(),
            content_type: content_type.map(str::to_string),
            body: String::new(),
        }
    }

    #[test]
    fn success_covers_the_2xx_range_only() {
        assert!(response(200, None).is_success());
        assert!(response(204, None).is_success());
        assert!(!response(304, None).is_success());
        assert!(!response(404, None).is_success());
    }

    #[test]
    fn json_detection_accepts_parameters_and_case() {
        assert!(response(200, Some("application/json")).is_json());
        assert!(response(200, Some("application/json; charset=utf-8")).is_json());
        assert!(response(200, Some("Application/JSON")).is_json());
        assert!(!response(200, Some("text/html")).is_json());
        assert!(!response(200, Some("application/vnd.api+json")).is_json());
        assert!(!response(200, None).is_json());
    }

    #[test]
    fn status_text_uses_canonical_reason() {
        assert_eq!(status_text(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(status_text(StatusCode::from_u16(599).unwrap()), "");
    }
}
