use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};
use resttable_util::format_last_updated;

use super::{
    detail, layout::MainLayout, table,
    theme::{Theme, theme_helpers as th},
};
use crate::app::App;

const KEY_HINTS: &str = "r refresh · i interval · s sort · ←→↑↓ move · n/p page · +/- size · Tab pane · Enter expand · q quit";

/// Renders one frame: header, optional error banner, table, detail pane, and footer.
pub fn draw(frame: &mut Frame, app: &App, theme: &dyn Theme) {
    let layout = MainLayout::split(frame.area(), app.result.error.is_some());

    render_header(frame, layout.header, app, theme);
    if let (Some(area), Some(message)) = (layout.banner, app.result.error.as_deref()) {
        render_error_banner(frame, area, message, theme);
    }
    table::render(frame, layout.table, app, theme);
    detail::render(frame, layout.detail, app, theme);
    render_footer(frame, layout.footer, app, theme);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let result = &app.result;
    let status_style = if result.error.is_some() {
        theme.status_error()
    } else {
        theme.status_success()
    };

    let mut title = vec![
        Span::styled("Resttable", theme.accent_emphasis_style()),
        Span::raw("  "),
        Span::styled(format!("● {}", result.status_label()), status_style),
    ];
    if result.loading {
        title.push(Span::styled("  ⟳ Loading…", theme.status_info()));
    }

    let last_updated = result
        .last_fetched_at
        .map(format_last_updated)
        .unwrap_or_else(|| "never".to_string());
    let divider = || Span::styled("  │  ", theme.text_muted_style());
    let details = vec![
        Span::styled(format!("Last updated: {last_updated}"), theme.text_secondary_style()),
        divider(),
        Span::styled(format!("Records: {} items", result.row_count()), theme.text_secondary_style()),
        divider(),
        Span::styled(app.interval.label(), theme.text_secondary_style()),
    ];

    let url = if app.config.has_url() { app.config.url.as_str() } else { "No API URL configured" };
    let lines = vec![Line::from(title), Line::from(Span::styled(url, theme.link_style())), Line::from(details)];
    let header = Paragraph::new(lines)
        .block(th::block(theme, None, false).borders(ratatui::widgets::Borders::BOTTOM))
        .style(th::panel_style(theme));
    frame.render_widget(header, area);
}

fn render_error_banner(frame: &mut Frame, area: Rect, message: &str, theme: &dyn Theme) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled("Error: ", theme.status_error().add_modifier(Modifier::BOLD)),
        Span::styled(message, theme.text_primary_style()),
    ]))
    .wrap(Wrap { trim: true })
    .block(th::block(theme, None, false).border_style(theme.status_error()));
    frame.render_widget(banner, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let pagination = &app.pagination;
    let mut status = vec![
        Span::styled(pagination.range_label(), theme.text_primary_style()),
        Span::styled("  ·  ", theme.text_muted_style()),
        Span::styled(pagination.page_info(), theme.text_secondary_style()),
        Span::styled(format!("  ·  {} / page", pagination.page_size), theme.text_secondary_style()),
    ];
    if let Some(column) = app.selected_column() {
        status.push(Span::styled("  ·  Column: ", theme.text_muted_style()));
        status.push(Span::styled(column.title.clone(), theme.text_primary_style()));
        status.push(Span::styled(format!(" ({})", column.tooltip()), theme.text_muted_style()));
    }

    let footer = Paragraph::new(vec![
        Line::from(status),
        Line::from(Span::styled(KEY_HINTS, theme.text_muted_style())),
    ])
    .style(th::panel_style(theme));
    frame.render_widget(footer, area);
}
