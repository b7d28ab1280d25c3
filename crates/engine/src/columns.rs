//! Column inference and sorting for schema-less rows.

use std::cmp::Ordering;

use resttable_types::Record;
use resttable_util::format_header;
use serde_json::Value;

/// One table column, derived from the first record's keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: String,
    pub title: String,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let title = format_header(&key);
        Self { key, title }
    }

    /// Raw record key, shown as a subtitle under the formatted title.
    pub fn tooltip(&self) -> &str {
        &self.key
    }

    pub fn sorter(&self) -> ColumnSorter {
        ColumnSorter::new(self.key.clone())
    }
}

/// Derive the column set for `rows`.
///
/// Only the first record is inspected; keys that appear only in later
/// records get no column. A first record that is not an object yields no
/// columns.
pub fn infer_columns(rows: &[Record]) -> Vec<ColumnDescriptor> {
    match rows.first() {
        Some(Value::Object(first)) => first.keys().map(ColumnDescriptor::new).collect(),
        _ => Vec::new(),
    }
}

/// Orders records by the value stored under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSorter {
    key: String,
}

#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(String),
    Number(f64),
}

impl ColumnSorter {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compare two records.
    ///
    /// Two string values compare case-insensitively first, lower case before
    /// upper case on ties, then by code point. Any other pair is compared
    /// numerically after coercion; a value that does not coerce to a number
    /// makes the pair equal.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        compare_keys(&self.sort_key(a), &self.sort_key(b))
    }

    fn sort_key(&self, record: &Record) -> SortKey {
        match record.get(&self.key) {
            Some(Value::String(text)) => SortKey::Text(text.clone()),
            Some(composite @ (Value::Array(_) | Value::Object(_))) => {
                SortKey::Text(serde_json::to_string(composite).unwrap_or_default())
            }
            Some(Value::Number(number)) => SortKey::Number(number.as_f64().unwrap_or(f64::NAN)),
            Some(Value::Bool(true)) => SortKey::Number(1.0),
            Some(Value::Bool(false) | Value::Null) | None => SortKey::Number(0.0),
        }
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => locale_compare(a, b),
        _ => coerce_number(a)
            .partial_cmp(&coerce_number(b))
            .unwrap_or(Ordering::Equal),
    }
}

fn coerce_number(key: &SortKey) -> f64 {
    match key {
        SortKey::Number(number) => *number,
        SortKey::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                parse_numeric_text(trimmed)
            }
        }
    }
}

/// Numeric value of trimmed text, following the ECMAScript `Number()` grammar
/// rather than Rust's float syntax: `Infinity` is spelled out, `inf` and `NaN`
/// do not parse, and unsigned `0x`/`0o`/`0b` literals do.
fn parse_numeric_text(text: &str) -> f64 {
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match text.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => 10,
    };
    if radix != 10 {
        let digits = &text[2..];
        if digits.starts_with(['+', '-']) {
            return f64::NAN;
        }
        return u128::from_str_radix(digits, radix).map_or(f64::NAN, |value| value as f64);
    }
    if text.chars().any(|ch| ch.is_ascii_alphabetic() && !matches!(ch, 'e' | 'E')) {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

/// Case-insensitive ordering with lower case winning ties, then code point.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| lower_case_first(a, b))
        .then_with(|| a.cmp(b))
}

fn lower_case_first(a: &str, b: &str) -> Ordering {
    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => Ordering::Equal,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Which column the table is sorted by, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(String, SortDirection)>,
}

impl SortState {
    /// Advance the sort for `key`: unsorted, ascending, descending, unsorted.
    /// Picking a different column starts it at ascending.
    pub fn cycle(&mut self, key: &str) {
        self.active = match self.active.take() {
            Some((current, SortDirection::Ascending)) if current == key => Some((current, SortDirection::Descending)),
            Some((current, SortDirection::Descending)) if current == key => None,
            _ => Some((key.to_string(), SortDirection::Ascending)),
        };
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn column(&self) -> Option<&str> {
        self.active.as_ref().map(|(key, _)| key.as_str())
    }

    pub fn direction_for(&self, key: &str) -> Option<SortDirection> {
        self.active
            .as_ref()
            .filter(|(current, _)| current == key)
            .map(|(_, direction)| *direction)
    }

    /// Display order of `rows` as indices into the slice.
    ///
    /// The sort is stable in both directions: records that compare equal
    /// keep their fetched order.
    pub fn sorted_indices(&self, rows: &[Record]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        let Some((key, direction)) = &self.active else {
            return indices;
        };

        let sorter = ColumnSorter::new(key.as_str());
        let keys: Vec<SortKey> = rows.iter().map(|row| sorter.sort_key(row)).collect();
        let direction = *direction;
        merge_sort_by(&mut indices, |&a, &b| {
            let ordering = compare_keys(&keys[a], &keys[b]);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        indices
    }
}

/// Stable bottom-up merge sort. The coerced column comparison is not a total
/// order for mixed or unparsable values, and `slice::sort_by` may panic on one.
fn merge_sort_by<T: Copy, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut buffer = items.to_vec();
    let mut width = 1;
    while width < items.len() {
        let mut start = 0;
        while start < items.len() {
            let mid = (start + width).min(items.len());
            let end = (start + 2 * width).min(items.len());
            let (mut left, mut right, mut out) = (start, mid, start);
            while left < mid && right < end {
                if compare(&items[right], &items[left]) == Ordering::Less {
                    buffer[out] = items[right];
                    right += 1;
                } else {
                    buffer[out] = items[left];
                    left += 1;
                }
                out += 1;
            }
            buffer[out..out + (mid - left)].copy_from_slice(&items[left..mid]);
            out += mid - left;
            buffer[out..out + (end - right)].copy_from_slice(&items[right..end]);
            start = end;
        }
        items.copy_from_slice(&buffer);
        width *= 2;
    }
}
