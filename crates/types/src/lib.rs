//! Shared type definitions for resttable.
//!
//! The endpoint configuration, the fetch result slot that front ends observe,
//! and the fetch error taxonomy live here so that the HTTP layer, the engine,
//! and the front ends agree on a single vocabulary.

mod config;
mod error;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

pub use config::{DEFAULT_ENDPOINT_URL, EndpointConfig, KeyValuePair, RefreshInterval};
pub use error::FetchError;

/// One table row. Usually a JSON object; a scalar payload is wrapped as a
/// single row as-is.
pub type Record = Value;

/// Observable state of the most recent fetch cycle.
///
/// `rows` is shared behind an `Arc` so observers can hold on to a snapshot
/// cheaply; `generation` increments every time `rows` is replaced and is the
/// identity derived data (columns, sort order) should be keyed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchResult {
    pub rows: Arc<Vec<Record>>,
    pub generation: u64,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub loading: bool,
}

impl FetchResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table should show its "no data" placeholder instead of rows.
    pub fn is_empty_idle(&self) -> bool {
        self.rows.is_empty() && !self.loading && self.error.is_none()
    }

    /// Status badge text shown next to the title.
    pub fn status_label(&self) -> &'static str {
        if self.error.is_some() { "Connection Error" } else { "Connected" }
    }
}
