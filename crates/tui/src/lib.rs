//! # Resttable TUI Library
//!
//! Terminal front end for resttable: a live table of whatever records the
//! configured endpoint returns, built with Ratatui and Crossterm.
//!
//! ## Key Features
//!
//! - Header with endpoint, connection status, last update time, record count
//!   and refresh cadence
//! - Inferred columns with per-column sort cycling
//! - Client-side pagination with adjustable page size
//! - Detail pane rendering nested values as an expandable tree
//! - Auto-refresh presets, persisted through the settings store
//!
//! ## Architecture
//!
//! `App` holds view state and turns key presses into `Effect`s; the runtime
//! owns the terminal, the fetch controller, and the polling scheduler, and
//! executes those effects.

mod app;
mod pagination;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use resttable_api::HttpTransport;
use resttable_engine::WidgetSettings;

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Returns terminal setup, drawing, or teardown failures. Fetch failures are
/// not errors here; they are shown in the UI.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use resttable_api::RestClient;
/// use resttable_engine::WidgetSettings;
/// use resttable_util::InMemoryStore;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let settings = WidgetSettings::load(Arc::new(InMemoryStore::new()));
///     resttable_tui::run(settings, Arc::new(RestClient::new()?)).await
/// }
/// ```
pub async fn run(settings: WidgetSettings, transport: Arc<dyn HttpTransport>) -> Result<()> {
    ui::runtime::run_app(settings, transport).await
}
