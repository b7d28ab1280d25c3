//! # Text Processing Utilities
//!
//! Column title formatting, width-aware truncation for terminal cells, and
//! redaction of credentials before anything is written to logs.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const REDACTED: &str = "[REDACTED]";

/// Turn a record key into a column title.
///
/// Underscores become spaces, then the first character of every word is
/// upper-cased. A word starts at the beginning of the string or after any
/// character that is not an ASCII letter, digit or underscore. Everything
/// else is left as-is, so `userId` stays `UserId`.
///
/// # Example
/// ```rust
/// use resttable_util::format_header;
///
/// assert_eq!(format_header("user_id"), "User Id");
/// assert_eq!(format_header("a"), "A");
/// assert_eq!(format_header("address.geo-lat"), "Address.Geo-Lat");
/// ```
pub fn format_header(key: &str) -> String {
    let mut title = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        let is_word_char = ch.is_ascii_alphanumeric();
        if is_word_char && at_word_start {
            title.push(ch.to_ascii_uppercase());
        } else {
            title.push(ch);
        }
        at_word_start = !is_word_char;
    }
    title
}

/// Truncate `text` so it occupies at most `max_width` terminal columns,
/// ending with an ellipsis when anything was cut.
pub fn fit_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut fitted = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        fitted.push(ch);
    }
    fitted.push('…');
    fitted
}

/// Redacts values that look like credentials in a string.
///
/// Covers `Authorization` header lines and query parameters whose name
/// mentions a key, token, secret, password or signature.
///
/// # Example
/// ```rust
/// use resttable_util::redact_sensitive;
///
/// assert_eq!(
///     redact_sensitive("https://api.example.com/v1?api_key=abc123&limit=5"),
///     "https://api.example.com/v1?api_key=[REDACTED]&limit=5"
/// );
/// assert_eq!(redact_sensitive("Authorization: Bearer abc.def"), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}")
            })
            .to_string();
    }
    redacted
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)(authorization\s*[:=]\s*)(?:(?:bearer|basic|token)\s+)?[^\s,;]+",
            r"(?i)([?&][\w.\-]*(?:key|token|secret|password|signature)[\w.\-]*=)[^&#\s]+",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("redaction pattern compiles"))
        .collect()
    });

    &REDACT_PATTERNS
}
