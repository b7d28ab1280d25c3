//! Screen regions for the main view.
use ratatui::prelude::*;

/// Areas produced by [`MainLayout::split`], top to bottom.
#[derive(Debug, Clone, Copy)]
pub(super) struct MainLayout {
    pub header: Rect,
    pub banner: Option<Rect>,
    pub table: Rect,
    pub detail: Rect,
    pub footer: Rect,
}

impl MainLayout {
    /// Wide terminals put the detail pane beside the table; narrow ones stack it below.
    pub fn split(size: Rect, show_banner: bool) -> Self {
        let banner_height = if show_banner { 3 } else { 0 };
        let vertical = Layout::vertical([
            Constraint::Length(4),             // header
            Constraint::Length(banner_height), // error banner
            Constraint::Min(5),                // table + detail
            Constraint::Length(2),             // pagination + hints
        ])
        .split(size);

        let body = if size.width >= 120 {
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)]).split(vertical[2])
        } else {
            Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).split(vertical[2])
        };

        Self {
            header: vertical[0],
            banner: show_banner.then_some(vertical[1]),
            table: body[0],
            detail: body[1],
            footer: vertical[3],
        }
    }
}
