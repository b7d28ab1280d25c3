//! Fetch orchestration: request building, execution, and row normalization
//! behind a single observable [`FetchResult`] slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use chrono::Utc;
use resttable_api::{HttpTransport, build_request};
use resttable_types::{EndpointConfig, FetchError, FetchResult, Record};
use resttable_util::http::parse_response_json_strict;
use resttable_util::{normalize_rows, redact_sensitive};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::probe::{ProbeOutcome, probe};

/// Owns the shared fetch result and runs fetch cycles against it.
///
/// Overlapping calls to [`FetchController::fetch`] are not serialized and an
/// in-flight request is never aborted: whichever cycle completes last decides
/// the stored rows. `loading` stays true while any cycle is pending.
pub struct FetchController {
    transport: Arc<dyn HttpTransport>,
    state: watch::Sender<FetchResult>,
    in_flight: AtomicUsize,
}

impl FetchController {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        let (state, _) = watch::channel(FetchResult::default());
        Self {
            transport,
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Current state of the result slot.
    pub fn snapshot(&self) -> FetchResult {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever the result slot changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchResult> {
        self.state.subscribe()
    }

    /// Run one fetch cycle for `config`.
    ///
    /// A blank URL is a no-op that returns the current result untouched. Any
    /// other failure is recorded as the result's `error` (keeping the previous
    /// rows) and returned to the caller.
    pub async fn fetch(&self, config: &EndpointConfig) -> Result<FetchResult, FetchError> {
        if !config.has_url() {
            debug!("fetch skipped: no endpoint url configured");
            return Ok(self.snapshot());
        }

        let cycle = self.begin_cycle();
        let start = Instant::now();
        let outcome = self.run_cycle(config).await;
        match &outcome {
            Ok(rows) => debug!(
                url = %redact_sensitive(&config.url),
                rows = rows.len(),
                duration_ms = start.elapsed().as_millis(),
                "fetch completed"
            ),
            Err(error) => warn!(
                url = %redact_sensitive(&config.url),
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "fetch failed"
            ),
        }

        match outcome {
            Ok(rows) => {
                self.state.send_modify(|result| {
                    result.rows = Arc::new(rows);
                    result.generation += 1;
                    result.last_fetched_at = Some(Utc::now());
                    result.error = None;
                });
                drop(cycle);
                Ok(self.snapshot())
            }
            Err(error) => {
                self.state.send_modify(|result| result.error = Some(error.to_string()));
                drop(cycle);
                Err(error)
            }
        }
    }

    /// Check that `config` reaches a JSON endpoint without touching the result slot.
    pub async fn probe(&self, config: &EndpointConfig) -> ProbeOutcome {
        probe(self.transport.as_ref(), config).await
    }

    async fn run_cycle(&self, config: &EndpointConfig) -> Result<Vec<Record>, FetchError> {
        let request = build_request(config)?;
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            return Err(FetchError::http(response.status, response.status_text));
        }
        if !response.is_json() {
            return Err(FetchError::NotJson {
                content_type: response.content_type,
            });
        }

        let payload = parse_response_json_strict(&response.body, Some(response.status))
            .map_err(|error| FetchError::Parse(error.to_string()))?;
        Ok(normalize_rows(payload))
    }

    fn begin_cycle(&self) -> CycleGuard<'_> {
        self.state.send_modify(|result| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            result.loading = true;
            result.error = None;
        });
        CycleGuard { controller: self }
    }
}

/// Marks one cycle as settled when dropped, including when the fetch future
/// itself is dropped mid-request.
struct CycleGuard<'a> {
    controller: &'a FetchController,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let controller = self.controller;
        controller.state.send_modify(|result| {
            let remaining = controller.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            result.loading = remaining > 0;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{GatedTransport, ScriptedTransport, json_response, response};
    use serde_json::json;

    fn config(url: &str) -> EndpointConfig {
        EndpointConfig::for_url(url)
    }

    #[tokio::test]
    async fn empty_url_is_a_no_op() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let controller = FetchController::new(transport.clone());
        let mut observer = controller.subscribe();

        let result = controller.fetch(&config("  ")).await.unwrap();

        assert!(!result.loading);
        assert_eq!(result.generation, 0);
        assert_eq!(transport.request_count(), 0);
        assert!(!observer.has_changed().unwrap(), "no state change may be published");
    }

    #[tokio::test]
    async fn success_stores_normalized_rows() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(
            200,
            r#"{"data": [{"id": 1}, {"id": 2}], "meta": {"total": 2}}"#,
        ))]));
        let controller = FetchController::new(transport);

        let result = controller.fetch(&config("https://api.example.com/users")).await.unwrap();

        assert_eq!(*result.rows, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(result.generation, 1);
        assert!(result.last_fetched_at.is_some());
        assert!(result.error.is_none());
        assert!(!result.loading);
    }

    #[tokio::test]
    async fn request_carries_params_and_headers() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json_response(200, "[]"))]));
        let controller = FetchController::new(transport.clone());
        let config = EndpointConfig {
            url: "https://api.example.com/users".into(),
            headers: vec![resttable_types::KeyValuePair::new("X-Api-Key", "k")],
            params: vec![resttable_types::KeyValuePair::new("limit", "5")],
        };

        controller.fetch(&config).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.com/users?limit=5");
        assert_eq!(requests[0].headers["x-api-key"], "k");
    }

    #[tokio::test]
    async fn failures_keep_previous_rows_and_record_the_message() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(json_response(200, r#"[{"id": 1}]"#)),
            Ok(response(503, "Service Unavailable", Some("application/json"), "{}")),
            Ok(response(200, "OK", Some("text/html"), "<html></html>")),
            Ok(json_response(200, "{not json")),
            Err(FetchError::Network("connection refused".into())),
        ]));
        let controller = FetchController::new(transport);
        let endpoint = config("https://api.example.com/users");

        controller.fetch(&endpoint).await.unwrap();

        let error = controller.fetch(&endpoint).await.unwrap_err();
        assert_eq!(error, FetchError::http(503, "Service Unavailable"));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("API Error: 503 Service Unavailable"));
        assert_eq!(*snapshot.rows, vec![json!({"id": 1})]);
        assert_eq!(snapshot.generation, 1);
        assert!(!snapshot.loading);

        let error = controller.fetch(&endpoint).await.unwrap_err();
        assert!(matches!(error, FetchError::NotJson { content_type: Some(ref value) } if value == "text/html"));
        assert_eq!(controller.snapshot().error.as_deref(), Some("API did not return JSON data"));

        let error = controller.fetch(&endpoint).await.unwrap_err();
        assert!(matches!(error, FetchError::Parse(_)));
        assert!(controller.snapshot().error.unwrap().starts_with("Invalid JSON"));

        let error = controller.fetch(&endpoint).await.unwrap_err();
        assert_eq!(error, FetchError::Network("connection refused".into()));
        assert_eq!(*controller.snapshot().rows, vec![json!({"id": 1})]);
    }

    #[tokio::test]
    async fn invalid_url_fails_without_a_request() {
        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let controller = FetchController::new(transport.clone());

        let error = controller.fetch(&config("not a url")).await.unwrap_err();

        assert_eq!(error, FetchError::invalid_url());
        assert_eq!(transport.request_count(), 0);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("Invalid API URL"));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn next_cycle_clears_the_previous_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(response(500, "Internal Server Error", None, "")),
            Ok(json_response(200, r#"{"id": 7}"#)),
        ]));
        let controller = FetchController::new(transport);
        let endpoint = config("https://api.example.com/thing");

        assert!(controller.fetch(&endpoint).await.is_err());
        let result = controller.fetch(&endpoint).await.unwrap();

        assert!(result.error.is_none());
        assert_eq!(*result.rows, vec![json!({"id": 7})]);
    }

    #[tokio::test]
    async fn starting_a_cycle_clears_the_error_before_the_response_arrives() {
        let transport = Arc::new(GatedTransport::new(2));
        let controller = Arc::new(FetchController::new(transport.clone()));
        let endpoint = config("https://api.example.com/users");

        let failing = tokio::spawn({
            let controller = Arc::clone(&controller);
            let endpoint = endpoint.clone();
            async move { controller.fetch(&endpoint).await }
        });
        transport.wait_for_requests(1).await;
        transport.release(0, response(503, "Service Unavailable", None, ""));
        assert!(failing.await.unwrap().is_err());
        assert!(controller.snapshot().error.is_some());

        let retry = tokio::spawn({
            let controller = Arc::clone(&controller);
            let endpoint = endpoint.clone();
            async move { controller.fetch(&endpoint).await }
        });
        transport.wait_for_requests(2).await;
        let pending = controller.snapshot();
        assert!(pending.error.is_none());
        assert!(pending.loading);

        transport.release(1, json_response(200, "[]"));
        retry.await.unwrap().unwrap();
        assert!(!controller.snapshot().loading);
    }

    #[tokio::test]
    async fn overlapping_fetches_last_completion_wins_and_loading_holds() {
        let transport = Arc::new(GatedTransport::new(2));
        let controller = Arc::new(FetchController::new(transport.clone()));
        let endpoint = config("https://api.example.com/users");

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            let endpoint = endpoint.clone();
            async move { controller.fetch(&endpoint).await }
        });
        transport.wait_for_requests(1).await;
        let second = tokio::spawn({
            let controller = Arc::clone(&controller);
            let endpoint = endpoint.clone();
            async move { controller.fetch(&endpoint).await }
        });
        transport.wait_for_requests(2).await;
        assert!(controller.snapshot().loading);

        transport.release(1, json_response(200, r#"[{"cycle": "second"}]"#));
        second.await.unwrap().unwrap();
        let snapshot = controller.snapshot();
        assert!(snapshot.loading, "first cycle is still pending");
        assert_eq!(*snapshot.rows, vec![json!({"cycle": "second"})]);

        transport.release(0, json_response(200, r#"[{"cycle": "first"}]"#));
        first.await.unwrap().unwrap();
        let snapshot = controller.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(*snapshot.rows, vec![json!({"cycle": "first"})]);
        assert_eq!(snapshot.generation, 2);
    }

    #[tokio::test]
    async fn dropping_an_in_flight_fetch_clears_loading() {
        let transport = Arc::new(GatedTransport::new(1));
        let controller = Arc::new(FetchController::new(transport.clone()));

        let pending = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.fetch(&config("https://api.example.com/slow")).await }
        });
        transport.wait_for_requests(1).await;
        assert!(controller.snapshot().loading);

        pending.abort();
        let _ = pending.await;

        assert!(!controller.snapshot().loading);
    }
}
