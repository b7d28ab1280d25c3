//! UI rendering module for the TUI application.
//!
//! The runtime owns the terminal and the event loop; `main` draws one frame
//! from `App` state using the table and detail views and the active theme.

mod detail;
mod layout;
mod main;
pub mod runtime;
mod table;
pub mod theme;
