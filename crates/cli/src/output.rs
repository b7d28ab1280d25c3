//! Plain-text rendering for the non-interactive commands.

use chrono::{DateTime, Utc};
use resttable_engine::{FetchResult, cell_text, infer_columns};
use resttable_types::Record;
use resttable_util::{fit_to_width, format_age, format_last_updated};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

const MAX_COLUMN_WIDTH: usize = 32;

/// Renders rows as an aligned text table with a record count footer.
pub fn render_table(rows: &[Record]) -> String {
    if rows.is_empty() {
        return "No Data Available".to_string();
    }
    let columns = infer_columns(rows);
    if columns.is_empty() {
        let mut out: Vec<String> = rows.iter().map(cell_text).collect();
        out.push(record_count(rows.len()));
        return out.join("\n");
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| cell_text(row.get(&column.key).unwrap_or(&Value::Null)))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].width())
                .chain(std::iter::once(column.title.width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format_line(columns.iter().map(|column| column.title.as_str()), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "─".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str), &widths));
    }
    lines.push(record_count(rows.len()));
    lines.join("\n")
}

fn format_line<'a>(texts: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = texts
        .zip(widths)
        .map(|(text, &width)| {
            let fitted = fit_to_width(text, width);
            let padding = width.saturating_sub(fitted.width());
            format!("{fitted}{}", " ".repeat(padding))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn record_count(count: usize) -> String {
    match count {
        1 => "1 record".to_string(),
        n => format!("{n} records"),
    }
}

/// One line for `watch`: wall-clock time plus either the row count or the error.
pub fn refresh_summary(result: &FetchResult, now: DateTime<Utc>) -> String {
    let clock = format_last_updated(now);
    match (&result.error, result.last_fetched_at) {
        (Some(error), _) => format!("[{clock}] error: {error} ({} cached)", record_count(result.row_count())),
        (None, Some(fetched_at)) => format!(
            "[{clock}] {}, updated {}",
            record_count(result.row_count()),
            format_age(fetched_at, now)
        ),
        (None, None) => format!("[{clock}] waiting for first response"),
    }
}
