//! Persisted widget settings: the endpoint configuration and refresh cadence.

use std::sync::Arc;

use resttable_types::{EndpointConfig, RefreshInterval};
use resttable_util::{KeyValueStore, SettingsStoreError};
use tracing::warn;

/// Store key for the JSON-encoded [`EndpointConfig`].
pub const API_CONFIG_KEY: &str = "apiConfig";
/// Store key for the refresh interval in decimal seconds.
pub const REFRESH_INTERVAL_KEY: &str = "refreshInterval";

/// Settings loaded once from a [`KeyValueStore`] and written back on every change.
pub struct WidgetSettings {
    store: Arc<dyn KeyValueStore>,
    config: EndpointConfig,
    refresh_interval: RefreshInterval,
}

impl WidgetSettings {
    /// Read both settings from `store`.
    ///
    /// Missing values fall back to the defaults silently; unreadable or
    /// malformed ones fall back with a warning.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let config = read_value(store.as_ref(), API_CONFIG_KEY, |raw| {
            serde_json::from_str::<EndpointConfig>(raw).map_err(|error| error.to_string())
        })
        .unwrap_or_default();
        let refresh_interval = read_value(store.as_ref(), REFRESH_INTERVAL_KEY, |raw| {
            raw.parse::<RefreshInterval>().map_err(|error| error.to_string())
        })
        .unwrap_or_default();

        Self {
            store,
            config,
            refresh_interval,
        }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn refresh_interval(&self) -> RefreshInterval {
        self.refresh_interval
    }

    pub fn set_config(&mut self, config: EndpointConfig) -> Result<(), SettingsStoreError> {
        self.config = config;
        self.save()
    }

    pub fn set_refresh_interval(&mut self, interval: RefreshInterval) -> Result<(), SettingsStoreError> {
        self.refresh_interval = interval;
        self.save()
    }

    /// Write both keys, whichever one changed.
    pub fn save(&self) -> Result<(), SettingsStoreError> {
        self.store.set(API_CONFIG_KEY, &serde_json::to_string(&self.config)?)?;
        self.store
            .set(REFRESH_INTERVAL_KEY, &self.refresh_interval.to_string())
    }
}

fn read_value<T>(store: &dyn KeyValueStore, key: &str, parse: impl FnOnce(&str) -> Result<T, String>) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(error) => {
            warn!(key, error = %error, "failed to read setting; using default");
            return None;
        }
    };
    match parse(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, error = %error, "ignoring malformed setting; using default");
            None
        }
    }
}
