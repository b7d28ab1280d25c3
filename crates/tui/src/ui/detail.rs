//! Detail pane: the selected cell as an expandable tree.

use ratatui::{
    prelude::*,
    widgets::{List, ListItem, ListState, Paragraph},
};
use resttable_engine::{LineKind, TreeLine};

use super::theme::{Theme, theme_helpers as th};
use crate::app::{App, Focus};

pub(super) fn render(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
    let focused = app.focus == Focus::Detail;
    let title = match (app.selected_column(), app.selected_row()) {
        (Some(column), Some(_)) => {
            let position = app.pagination.visible_range().start + app.row_cursor + 1;
            format!("{} · row {position}", column.title)
        }
        _ => "Detail".to_string(),
    };
    let block = th::block(theme, Some(title.as_str()), focused);

    let lines = app.detail_lines();
    if lines.is_empty() {
        let placeholder = Paragraph::new("Select a cell to inspect its value")
            .style(theme.text_muted_style())
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = lines.iter().map(|line| ListItem::new(tree_line(line, theme))).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(if focused { th::table_selected_style(theme) } else { Style::default() })
        .style(th::panel_style(theme));

    let mut state = ListState::default().with_selected(Some(app.detail_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn tree_line<'a>(line: &'a TreeLine, theme: &dyn Theme) -> Line<'a> {
    let mut spans = vec![
        Span::raw("  ".repeat(line.depth)),
        Span::styled(format!("{} ", line.disclosure.marker()), theme.accent_primary_style()),
    ];
    if let Some(label) = &line.label {
        spans.push(Span::styled(format!("{label}: "), theme.text_primary_style().add_modifier(Modifier::BOLD)));
    }
    let value_style = match line.kind {
        LineKind::Muted => theme.text_muted_style(),
        LineKind::Text => theme.text_primary_style(),
        LineKind::True => th::boolean_style(theme, true),
        LineKind::False => th::boolean_style(theme, false),
        LineKind::Link => theme.link_style(),
        LineKind::Image => {
            spans.push(Span::styled("[image] ", theme.text_muted_style()));
            theme.link_style()
        }
        LineKind::Composite => theme.text_secondary_style(),
    };
    spans.push(Span::styled(line.text.as_str(), value_style));
    Line::from(spans)
}
