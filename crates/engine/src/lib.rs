//! # Resttable Engine
//!
//! The engine turns an endpoint configuration into table-ready state: it runs
//! fetch cycles, keeps the shared [`FetchResult`] observers read from, drives
//! auto-refresh, and derives columns, sort order, and render trees from rows
//! whose shape is only known at runtime.
//!
//! ## Key Features
//!
//! - **Fetch cycles**: build, execute, validate, and normalize in one call,
//!   with errors recorded next to the last good rows
//! - **Polling**: a cancellable timer that never aborts a request in flight
//! - **Schema inference**: columns from the first record's keys
//! - **Sorting**: mixed-type column comparison with stable ordering
//! - **Render model**: classified cell values and expandable nested trees
//! - **Settings**: endpoint and cadence persisted through a key-value store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use resttable_api::RestClient;
//! use resttable_engine::{FetchController, infer_columns};
//! use resttable_types::EndpointConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let controller = FetchController::new(Arc::new(RestClient::new()?));
//! let result = controller.fetch(&EndpointConfig::default()).await?;
//! for column in infer_columns(&result.rows) {
//!     println!("{}", column.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`fetch`**: [`FetchController`] and the observable result slot
//! - **`probe`**: one-shot connectivity check
//! - **`polling`**: [`PollingScheduler`]
//! - **`columns`**: column inference, [`ColumnSorter`], and [`SortState`]
//! - **`render_model`**: [`classify`], expansion state, and [`flatten_tree`]
//! - **`settings`**: [`WidgetSettings`]

pub mod columns;
pub mod fetch;
pub mod polling;
pub mod probe;
pub mod render_model;
pub mod settings;

#[cfg(test)]
mod test_support;

pub use columns::{ColumnDescriptor, ColumnSorter, SortDirection, SortState, infer_columns, locale_compare};
pub use fetch::FetchController;
pub use polling::{PollingScheduler, PollingState};
pub use probe::{ProbeOutcome, probe};
pub use render_model::{
    CellId, Disclosure, ExpansionState, LineKind, NodePath, PathSegment, RenderNode, TreeLine, cell_text, classify,
    flatten_tree,
};
pub use resttable_types::{EndpointConfig, FetchError, FetchResult, RefreshInterval};
pub use settings::{API_CONFIG_KEY, REFRESH_INTERVAL_KEY, WidgetSettings};
