//! Results table: inferred columns, the current page of rows, and the
//! "No Data Available" placeholder.

use ratatui::{
    prelude::*,
    widgets::{Cell, Paragraph, Row, Table, TableState},
};
use resttable_engine::{RenderNode, cell_text, classify};
use resttable_util::fit_to_width;
use serde_json::Value;

use super::theme::{Theme, theme_helpers as th};
use crate::app::{App, Focus};

pub(super) fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let focused = app.focus == Focus::Table;
    let block = th::block(theme, Some("Records"), focused);

    if app.result.is_empty_idle() || (app.result.rows.is_empty() && app.result.error.is_some()) {
        render_placeholder(frame, area, block, "No Data Available", theme);
        return;
    }
    if app.result.rows.is_empty() {
        render_placeholder(frame, area, block, "Loading…", theme);
        return;
    }
    if app.columns.is_empty() {
        render_placeholder(frame, area, block, "Rows have no fields to show as columns", theme);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let column_width = (inner_width / app.columns.len()).saturating_sub(1).max(3);

    let header = Row::new(app.columns.iter().map(|column| {
        let arrow = app
            .sort
            .direction_for(&column.key)
            .map(|direction| format!(" {}", direction.arrow()))
            .unwrap_or_default();
        Cell::from(fit_to_width(&format!("{}{arrow}", column.title), column_width))
    }))
    .style(th::table_header_row_style(theme));

    let rows = app.visible_rows().iter().enumerate().map(|(position, &row_index)| {
        let record = &app.result.rows[row_index];
        let cells = app.columns.iter().map(|column| {
            let value = record.get(&column.key).unwrap_or(&Value::Null);
            Cell::from(fit_to_width(&cell_text(value), column_width)).style(cell_style(value, theme))
        });
        Row::new(cells).style(th::table_row_style(theme, position))
    });

    let widths = vec![Constraint::Fill(1); app.columns.len()];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(if focused { th::table_selected_style(theme) } else { Style::default() })
        .cell_highlight_style(if focused {
            theme.selection_style().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        })
        .style(th::panel_style(theme));

    let mut state = TableState::default()
        .with_selected(Some(app.row_cursor))
        .with_selected_column(Some(app.column_cursor));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_placeholder(frame: &mut Frame, area: Rect, block: ratatui::widgets::Block<'_>, message: &str, theme: &dyn Theme) {
    let placeholder = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(theme.text_muted_style())
        .block(block);
    frame.render_widget(placeholder, area);
}

fn cell_style(value: &Value, theme: &dyn Theme) -> Style {
    match classify(value) {
        RenderNode::Empty => theme.text_muted_style(),
        RenderNode::Boolean(flag) => th::boolean_style(theme, flag),
        RenderNode::Link(_) | RenderNode::Image(_) => theme.link_style(),
        RenderNode::List(_) | RenderNode::Map(_) => theme.accent_primary_style(),
        RenderNode::ScalarText(_) => Style::default(),
    }
}
