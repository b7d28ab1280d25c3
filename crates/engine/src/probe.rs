//! One-shot connectivity check used by the configuration screen and `resttable probe`.

use resttable_api::{HttpTransport, build_request};
use resttable_types::{EndpointConfig, FetchError};
use resttable_util::http::parse_response_json_strict;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Result of a connectivity probe, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub success: bool,
    pub message: String,
}

impl ProbeOutcome {
    fn passed(records: usize) -> Self {
        Self {
            success: true,
            message: format!("Connection successful! Received {records} records"),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Issue a single GET for `config` and report whether it returned JSON.
///
/// Unlike a fetch cycle this neither checks the declared content type nor
/// normalizes the payload: the record count is the length of a top-level
/// array, or 1 for anything else.
pub async fn probe(transport: &dyn HttpTransport, config: &EndpointConfig) -> ProbeOutcome {
    if !config.has_url() {
        return ProbeOutcome::failed("API URL is required");
    }

    let outcome = match run_probe(transport, config).await {
        Ok(records) => ProbeOutcome::passed(records),
        Err(FetchError::Http { status, status_text }) => {
            ProbeOutcome::failed(format!("Test failed: {status} {status_text}"))
        }
        Err(error) => ProbeOutcome::failed(error.to_string()),
    };
    if outcome.success {
        info!(message = %outcome.message, "probe succeeded");
    } else {
        debug!(message = %outcome.message, "probe failed");
    }
    outcome
}

async fn run_probe(transport: &dyn HttpTransport, config: &EndpointConfig) -> Result<usize, FetchError> {
    let request = build_request(config)?;
    let response = transport.execute(request).await?;
    if !response.is_success() {
        return Err(FetchError::http(response.status, response.status_text));
    }

    let payload = parse_response_json_strict(&response.body, Some(response.status))
        .map_err(|error| FetchError::Parse(error.to_string()))?;
    Ok(match payload {
        Value::Array(items) => items.len(),
        _ => 1,
    })
}
