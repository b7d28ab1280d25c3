//! # Response body parsing
//!
//! Strict JSON parsing for HTTP response bodies, with errors that carry
//! enough context (status, body preview) to be shown to the user as-is.

use serde_json::Value;
use thiserror::Error;

const PREVIEW_LIMIT: usize = 200;

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// # Arguments
/// * `text` - The raw HTTP response body text
/// * `status` - Optional HTTP status code for error context
///
/// # Errors
/// Returns a [`JsonParseError`] describing the parse failure. The message
/// includes the original serde error and up to 200 characters of the response
/// body (with whitespace collapsed).
///
/// # Example
/// ```rust
/// use resttable_util::http::parse_response_json_strict;
///
/// let value = parse_response_json_strict(r#"{"data": []}"#, Some(200)).unwrap();
/// assert!(value["data"].is_array());
///
/// let error = parse_response_json_strict("<html>", Some(200)).unwrap_err();
/// assert!(error.to_string().contains("status 200"));
/// assert_eq!(error.body_preview(), "<html>");
/// ```
pub fn parse_response_json_strict(text: &str, status: Option<u16>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, PREVIEW_LIMIT);

        JsonParseError::new(status_note, error, preview)
    })
}

fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_preview_is_marked() {
        let error = parse_response_json_strict("   ", None).unwrap_err();
        assert_eq!(error.body_preview(), "<empty>");
        assert!(error.to_string().contains("unknown status"));
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        let preview = truncate_response_preview("line one\n\n\tline two", 200);
        assert_eq!(preview, "line one line two");

        let long = "x".repeat(500);
        let preview = truncate_response_preview(&long, 10);
        assert_eq!(preview, format!("{}...", "x".repeat(10)));
    }

    #[test]
    fn bare_scalars_are_valid_json() {
        assert_eq!(parse_response_json_strict("42", Some(200)).unwrap(), serde_json::json!(42));
        assert_eq!(parse_response_json_strict("\"ok\"", Some(200)).unwrap(), serde_json::json!("ok"));
    }
}
