//! Application state and logic for the Resttable TUI.
//!
//! `App` owns everything the screen shows: the latest fetch result and the
//! data derived from it (columns, sort order, pagination), plus the cursor
//! and expansion state of the table and detail panes. Input arrives as
//! [`Msg`] values; anything that must leave the UI (a fetch, persisting the
//! refresh interval) is reported back as an [`Effect`] for the runtime.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use resttable_engine::{
    CellId, ColumnDescriptor, Disclosure, ExpansionState, FetchResult, NodePath, RefreshInterval, SortState, TreeLine, classify,
    flatten_tree, infer_columns,
};
use resttable_types::{EndpointConfig, Record};
use serde_json::Value;

use crate::pagination::PaginationState;

/// Messages that drive `App::update`.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Fetch immediately
    Refresh,
    /// Advance the auto-refresh preset
    CycleInterval,
    /// Cycle the sort on the selected column
    SortSelected,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    GrowPageSize,
    ShrinkPageSize,
    /// Switch keyboard focus between the table and the detail pane
    SwitchFocus,
    /// Expand or collapse the node under the detail cursor
    ToggleNode,
    Quit,
    /// The shared fetch result changed
    FetchUpdated(FetchResult),
}

/// Side effects requested by state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch,
    SetInterval(RefreshInterval),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    Detail,
}

pub struct App {
    pub config: EndpointConfig,
    pub interval: RefreshInterval,
    pub result: FetchResult,
    pub columns: Vec<ColumnDescriptor>,
    pub sort: SortState,
    /// Row indices in display order
    pub order: Vec<usize>,
    pub pagination: PaginationState,
    /// Cursor position within the current page
    pub row_cursor: usize,
    pub column_cursor: usize,
    pub expansion: ExpansionState,
    pub detail_cursor: usize,
    pub focus: Focus,
}

impl App {
    pub fn new(config: EndpointConfig, interval: RefreshInterval, result: FetchResult) -> Self {
        let mut app = Self {
            config,
            interval,
            result: FetchResult::default(),
            columns: Vec::new(),
            sort: SortState::default(),
            order: Vec::new(),
            pagination: PaginationState::default(),
            row_cursor: 0,
            column_cursor: 0,
            expansion: ExpansionState::default(),
            detail_cursor: 0,
            focus: Focus::default(),
        };
        app.apply_result(result);
        app
    }

    /// Map a key press to a message, if it is bound.
    pub fn message_for_key(&self, key: KeyEvent) -> Option<Msg> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c')).then_some(Msg::Quit);
        }
        let msg = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Msg::Quit,
            KeyCode::Char('r') => Msg::Refresh,
            KeyCode::Char('i') => Msg::CycleInterval,
            KeyCode::Char('s') => Msg::SortSelected,
            KeyCode::Char('n') | KeyCode::PageDown => Msg::NextPage,
            KeyCode::Char('p') | KeyCode::PageUp => Msg::PrevPage,
            KeyCode::Char('+') | KeyCode::Char('=') => Msg::GrowPageSize,
            KeyCode::Char('-') => Msg::ShrinkPageSize,
            KeyCode::Up | KeyCode::Char('k') => Msg::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => Msg::MoveDown,
            KeyCode::Left | KeyCode::Char('h') => Msg::MoveLeft,
            KeyCode::Right | KeyCode::Char('l') => Msg::MoveRight,
            KeyCode::Tab | KeyCode::BackTab => Msg::SwitchFocus,
            KeyCode::Enter | KeyCode::Char(' ') => Msg::ToggleNode,
            _ => return None,
        };
        Some(msg)
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Refresh => return vec![Effect::Fetch],
            Msg::Quit => return vec![Effect::Quit],
            Msg::CycleInterval => {
                self.interval = self.interval.next_preset();
                return vec![Effect::SetInterval(self.interval)];
            }
            Msg::FetchUpdated(result) => self.apply_result(result),
            Msg::SortSelected => {
                if let Some(column) = self.columns.get(self.column_cursor) {
                    let key = column.key.clone();
                    self.sort.cycle(&key);
                    self.refresh_order();
                }
            }
            Msg::NextPage => {
                self.pagination.next_page();
                self.reset_cursors();
            }
            Msg::PrevPage => {
                self.pagination.prev_page();
                self.reset_cursors();
            }
            Msg::GrowPageSize => {
                self.pagination.grow_page_size();
                self.reset_cursors();
            }
            Msg::ShrinkPageSize => {
                self.pagination.shrink_page_size();
                self.reset_cursors();
            }
            Msg::SwitchFocus => {
                self.focus = match self.focus {
                    Focus::Table => Focus::Detail,
                    Focus::Detail => Focus::Table,
                };
            }
            Msg::ToggleNode => self.toggle_node(),
            Msg::MoveUp | Msg::MoveDown | Msg::MoveLeft | Msg::MoveRight => self.move_cursor(msg),
        }
        Vec::new()
    }

    /// Swap in a new fetch result, re-deriving columns and order only when the
    /// rows themselves changed.
    fn apply_result(&mut self, result: FetchResult) {
        let rows_changed = result.generation != self.result.generation || self.order.len() != result.rows.len();
        self.result = result;
        if !rows_changed {
            return;
        }
        self.columns = infer_columns(&self.result.rows);
        if self.sort.column().is_some_and(|key| !self.columns.iter().any(|column| column.key == key)) {
            self.sort.clear();
        }
        self.column_cursor = self.column_cursor.min(self.columns.len().saturating_sub(1));
        self.refresh_order();
    }

    fn refresh_order(&mut self) {
        self.order = self.sort.sorted_indices(&self.result.rows);
        self.pagination.set_total_items(self.order.len());
        self.row_cursor = self.row_cursor.min(self.visible_rows().len().saturating_sub(1));
        self.detail_cursor = 0;
    }

    fn reset_cursors(&mut self) {
        self.row_cursor = 0;
        self.detail_cursor = 0;
    }

    fn move_cursor(&mut self, msg: Msg) {
        match (self.focus, msg) {
            (Focus::Table, Msg::MoveUp) => self.row_cursor = self.row_cursor.saturating_sub(1),
            (Focus::Table, Msg::MoveDown) => {
                let last = self.visible_rows().len().saturating_sub(1);
                self.row_cursor = (self.row_cursor + 1).min(last);
            }
            (Focus::Table, Msg::MoveLeft) => self.column_cursor = self.column_cursor.saturating_sub(1),
            (Focus::Table, Msg::MoveRight) => {
                let last = self.columns.len().saturating_sub(1);
                self.column_cursor = (self.column_cursor + 1).min(last);
            }
            (Focus::Detail, Msg::MoveUp) => self.detail_cursor = self.detail_cursor.saturating_sub(1),
            (Focus::Detail, Msg::MoveDown) => {
                let last = self.detail_lines().len().saturating_sub(1);
                self.detail_cursor = (self.detail_cursor + 1).min(last);
            }
            _ => return,
        }
        if self.focus == Focus::Table {
            self.detail_cursor = 0;
        }
    }

    fn toggle_node(&mut self) {
        let Some(cell) = self.selected_cell() else {
            return;
        };
        let path = match self.focus {
            Focus::Table => NodePath::root(),
            Focus::Detail => match self.detail_lines().get(self.detail_cursor) {
                Some(line) if line.disclosure != Disclosure::None => line.path.clone(),
                _ => return,
            },
        };
        self.expansion.toggle(&cell, &path);
        let last = self.detail_lines().len().saturating_sub(1);
        self.detail_cursor = self.detail_cursor.min(last);
    }

    /// Row indices shown on the current page, in display order.
    pub fn visible_rows(&self) -> &[usize] {
        &self.order[self.pagination.visible_range()]
    }

    /// Index of the selected row in fetched order.
    pub fn selected_row(&self) -> Option<usize> {
        self.visible_rows().get(self.row_cursor).copied()
    }

    pub fn selected_column(&self) -> Option<&ColumnDescriptor> {
        self.columns.get(self.column_cursor)
    }

    pub fn selected_cell(&self) -> Option<CellId> {
        Some(CellId::new(self.selected_row()?, self.selected_column()?.key.clone()))
    }

    pub fn selected_value(&self) -> Option<&Value> {
        let row: &Record = self.result.rows.get(self.selected_row()?)?;
        Some(row.get(&self.selected_column()?.key).unwrap_or(&Value::Null))
    }

    /// Visible lines of the selected cell's tree.
    pub fn detail_lines(&self) -> Vec<TreeLine> {
        match (self.selected_value(), self.selected_cell()) {
            (Some(value), Some(cell)) => flatten_tree(&classify(value), &self.expansion, &cell),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use serde_json::json;

    fn result(rows: Vec<Value>, generation: u64) -> FetchResult {
        FetchResult {
            rows: Arc::new(rows),
            generation,
            ..FetchResult::default()
        }
    }

    fn people() -> Vec<Value> {
        (1..=7)
            .map(|id| json!({"id": id, "name": format!("user {}", 8 - id), "address": {"city": "Gwenborough", "geo": {"lat": "-37"}}}))
            .collect()
    }

    fn app_with(rows: Vec<Value>) -> App {
        App::new(EndpointConfig::default(), RefreshInterval::OFF, result(rows, 1))
    }

    #[test]
    fn new_result_derives_columns_and_pages() {
        let app = app_with(people());
        let keys: Vec<&str> = app.columns.iter().map(|column| column.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "address"]);
        assert_eq!(app.visible_rows(), &[0, 1, 2, 3, 4]);
        assert_eq!(app.pagination.range_label(), "1-5 of 7 items");
    }

    #[test]
    fn keys_map_to_messages() {
        let app = app_with(Vec::new());
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(app.message_for_key(key(KeyCode::Char('r'))), Some(Msg::Refresh));
        assert_eq!(app.message_for_key(key(KeyCode::Char('i'))), Some(Msg::CycleInterval));
        assert_eq!(app.message_for_key(key(KeyCode::Tab)), Some(Msg::SwitchFocus));
        assert_eq!(
            app.message_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Msg::Quit)
        );
        assert_eq!(app.message_for_key(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn refresh_and_interval_become_effects() {
        let mut app = app_with(Vec::new());
        assert_eq!(app.update(Msg::Refresh), vec![Effect::Fetch]);
        assert_eq!(
            app.update(Msg::CycleInterval),
            vec![Effect::SetInterval(RefreshInterval::from_secs(5))]
        );
        assert_eq!(app.interval, RefreshInterval::from_secs(5));
        assert_eq!(app.update(Msg::Quit), vec![Effect::Quit]);
    }

    #[test]
    fn sorting_the_selected_column_reorders_rows() {
        let mut app = app_with(people());
        app.update(Msg::MoveRight);
        app.update(Msg::SortSelected);
        assert_eq!(app.sort.column(), Some("name"));
        assert_eq!(app.visible_rows(), &[6, 5, 4, 3, 2]);

        app.update(Msg::SortSelected);
        assert_eq!(app.visible_rows(), &[0, 1, 2, 3, 4]);
        app.update(Msg::SortSelected);
        assert_eq!(app.sort.column(), None);
    }

    #[test]
    fn paging_moves_the_window_and_resets_the_cursor() {
        let mut app = app_with(people());
        app.update(Msg::MoveDown);
        app.update(Msg::NextPage);
        assert_eq!(app.visible_rows(), &[5, 6]);
        assert_eq!(app.row_cursor, 0);

        app.update(Msg::MoveDown);
        app.update(Msg::MoveDown);
        assert_eq!(app.row_cursor, 1, "cursor stays on the page");

        app.update(Msg::GrowPageSize);
        assert_eq!(app.visible_rows().len(), 7);
    }

    #[test]
    fn same_generation_keeps_derived_state() {
        let mut app = app_with(people());
        app.update(Msg::MoveRight);
        app.update(Msg::SortSelected);

        let mut loading = app.result.clone();
        loading.loading = true;
        app.update(Msg::FetchUpdated(loading));
        assert!(app.result.loading);
        assert_eq!(app.sort.column(), Some("name"));
        assert_eq!(app.visible_rows(), &[6, 5, 4, 3, 2]);
    }

    #[test]
    fn new_rows_drop_sort_on_missing_columns() {
        let mut app = app_with(people());
        app.update(Msg::MoveRight);
        app.update(Msg::MoveRight);
        app.update(Msg::SortSelected);

        app.update(Msg::FetchUpdated(result(vec![json!({"sku": "A"})], 2)));
        assert_eq!(app.sort.column(), None);
        assert_eq!(app.column_cursor, 0);
        assert_eq!(app.pagination.range_label(), "1-1 of 1 items");
    }

    #[test]
    fn detail_pane_expands_nodes_one_level_at_a_time() {
        let mut app = app_with(people());
        app.update(Msg::MoveRight);
        app.update(Msg::MoveRight);
        assert_eq!(app.detail_lines().len(), 1);

        app.update(Msg::ToggleNode);
        let lines = app.detail_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].label.as_deref(), Some("geo"));
        assert_eq!(lines[2].disclosure, Disclosure::Collapsed);

        app.update(Msg::SwitchFocus);
        app.update(Msg::MoveDown);
        app.update(Msg::MoveDown);
        app.update(Msg::ToggleNode);
        assert_eq!(app.detail_lines().len(), 4);

        app.update(Msg::MoveUp);
        app.update(Msg::ToggleNode);
        assert_eq!(app.detail_lines().len(), 4, "scalar lines do not toggle");
    }

    #[test]
    fn missing_keys_render_as_empty() {
        let mut app = app_with(vec![json!({"a": 1}), json!({"b": 2})]);
        app.update(Msg::MoveDown);
        assert_eq!(app.selected_value(), Some(&Value::Null));
        assert_eq!(app.detail_lines()[0].text, "-");
    }
}
