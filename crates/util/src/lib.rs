//! Resttable utility functions and helpers.
//!
//! - [`envelope`]: row extraction for responses of unknown shape
//! - [`http`]: strict JSON parsing of response bodies
//! - [`settings_store`]: the key-value settings boundary
//! - [`text_processing`]: column titles, cell truncation, log redaction
//! - [`date_handling`]: "last updated" formatting

pub mod date_handling;
pub mod envelope;
pub mod http;
pub mod settings_store;
pub mod text_processing;

pub use date_handling::{format_age, format_last_updated};
pub use envelope::normalize_rows;
pub use settings_store::{InMemoryStore, JsonFileStore, KeyValueStore, SettingsStoreError};
pub use text_processing::{fit_to_width, format_header, redact_sensitive};
