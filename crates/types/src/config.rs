//! Endpoint configuration and refresh cadence.
//!
//! These types cross the settings boundary as JSON (`EndpointConfig`) and as
//! decimal text (`RefreshInterval`), so their serialized shape is part of the
//! persisted format.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoint used when no configuration has been stored yet.
pub const DEFAULT_ENDPOINT_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// A single header or query parameter entry as edited by the user.
///
/// Entries with an empty key or value are kept in the configuration (the
/// editor may still be filling them in) but are skipped when a request is
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// True when both the key and the value are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// Where and how to fetch the table rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
    #[serde(default)]
    pub params: Vec<KeyValuePair>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT_URL.to_string(),
            headers: vec![KeyValuePair::new("Content-Type", "application/json")],
            params: Vec::new(),
        }
    }
}

impl EndpointConfig {
    /// Configuration pointing at `url` with no headers or params.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Whether a fetch should be attempted at all.
    ///
    /// A blank URL means the configuration is not ready yet; fetching with it
    /// is a no-op rather than an error.
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Headers that will actually be sent.
    pub fn active_headers(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.headers.iter().filter(|pair| pair.is_complete())
    }

    /// Query parameters that will actually be appended.
    pub fn active_params(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.params.iter().filter(|pair| pair.is_complete())
    }
}

/// Auto-refresh cadence in whole seconds; zero disables polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshInterval(u64);

impl RefreshInterval {
    pub const OFF: RefreshInterval = RefreshInterval(0);

    /// Cadences offered by the front end, in display order.
    pub const PRESETS: [RefreshInterval; 5] = [
        RefreshInterval(0),
        RefreshInterval(5),
        RefreshInterval(15),
        RefreshInterval(30),
        RefreshInterval(60),
    ];

    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    pub const fn is_off(self) -> bool {
        self.0 == 0
    }

    /// Timer period, or `None` when polling is disabled.
    pub fn period(self) -> Option<Duration> {
        (!self.is_off()).then(|| Duration::from_secs(self.0))
    }

    /// The preset after this one, wrapping back to `OFF`.
    ///
    /// A non-preset value advances to the first preset greater than it.
    pub fn next_preset(self) -> Self {
        Self::PRESETS
            .iter()
            .copied()
            .find(|preset| preset.0 > self.0)
            .unwrap_or(Self::OFF)
    }

    /// Human label matching the refresh selector.
    pub fn label(self) -> String {
        match self.0 {
            0 => "No auto-refresh".to_string(),
            60 => "Every minute".to_string(),
            seconds => format!("Every {seconds} seconds"),
        }
    }
}

impl fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RefreshInterval {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_deserialize_as_empty() {
        let config: EndpointConfig = serde_json::from_str(r#"{"url":"https://api.example.com/users"}"#).unwrap();
        assert_eq!(config.url, "https://api.example.com/users");
        assert!(config.headers.is_empty());
        assert!(config.params.is_empty());
    }

    #[test]
    fn active_entries_skip_blank_keys_and_values() {
        let config = EndpointConfig {
            url: "https://api.example.com".into(),
            headers: vec![
                KeyValuePair::new("Authorization", "Bearer abc"),
                KeyValuePair::new("", "orphan"),
                KeyValuePair::new("X-Empty", ""),
            ],
            params: vec![KeyValuePair::default(), KeyValuePair::new("limit", "10")],
        };

        let headers: Vec<&str> = config.active_headers().map(|pair| pair.key.as_str()).collect();
        let params: Vec<&str> = config.active_params().map(|pair| pair.key.as_str()).collect();
        assert_eq!(headers, vec!["Authorization"]);
        assert_eq!(params, vec!["limit"]);
    }

    #[test]
    fn blank_url_is_not_ready() {
        assert!(!EndpointConfig::for_url("   ").has_url());
        assert!(EndpointConfig::default().has_url());
    }

    #[test]
    fn refresh_interval_cycles_through_presets() {
        let mut interval = RefreshInterval::OFF;
        let mut seen = Vec::new();
        for _ in 0..5 {
            interval = interval.next_preset();
            seen.push(interval.as_secs());
        }
        assert_eq!(seen, vec![5, 15, 30, 60, 0]);
        assert_eq!(RefreshInterval::from_secs(7).next_preset(), RefreshInterval::from_secs(15));
    }

    #[test]
    fn refresh_interval_labels_and_text_form() {
        assert_eq!(RefreshInterval::OFF.label(), "No auto-refresh");
        assert_eq!(RefreshInterval::from_secs(15).label(), "Every 15 seconds");
        assert_eq!(RefreshInterval::from_secs(60).label(), "Every minute");
        assert_eq!(RefreshInterval::from_secs(30).to_string(), "30");
        assert_eq!(" 5 ".parse::<RefreshInterval>().unwrap(), RefreshInterval::from_secs(5));
        assert!("five".parse::<RefreshInterval>().is_err());
        assert_eq!(RefreshInterval::OFF.period(), None);
    }
}
