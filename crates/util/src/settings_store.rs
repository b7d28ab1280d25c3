//! Key-value persistence for user settings.
//!
//! The settings boundary is a flat string-to-string store: callers decide how
//! each value is encoded (JSON for the endpoint configuration, decimal text
//! for the refresh interval). [`JsonFileStore`] writes the whole map to the
//! standard configuration directory (`~/.config/resttable/settings.json` on
//! most platforms); [`InMemoryStore`] is used for tests and when the config
//! directory is unusable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::{config_dir, home_dir};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "RESTTABLE_SETTINGS_PATH";

/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Error surfaced when reading or writing settings fails.
#[derive(Debug, Error)]
pub enum SettingsStoreError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A string key-value store the engine persists settings through.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, SettingsStoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsStoreError>;
}

/// Store kept only in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<IndexMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsStoreError> {
        Ok(self.entries.lock().expect("settings lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsStoreError> {
        self.entries
            .lock()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// Every `set` rewrites the file; the map is small and writes only happen
/// when the user changes a setting.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<IndexMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, or at the default location when `None`.
    ///
    /// A missing file yields an empty store. A corrupt file is logged and
    /// treated as empty; it is overwritten on the next `set`.
    pub fn open<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, SettingsStoreError> {
        let resolved_path = match path.into() {
            Some(path) => path,
            None => default_settings_path(),
        };
        let entries = load_entries(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            entries: Mutex::new(entries),
        })
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, entries: &IndexMap<String, String>) -> Result<(), SettingsStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsStoreError> {
        Ok(self.entries.lock().expect("settings lock poisoned").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsStoreError> {
        let mut entries = self.entries.lock().expect("settings lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.save_locked(&entries)
    }
}

/// Resolve the settings file location, honoring [`SETTINGS_PATH_ENV`].
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    resttable_config_dir().join(SETTINGS_FILE_NAME)
}

/// Directory holding resttable's settings and log files.
pub fn resttable_config_dir() -> PathBuf {
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("resttable")
}

fn expand_tilde(path: &str) -> PathBuf {
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    match path {
        "~" => home(),
        _ => match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
            Some(rest) => home().join(rest),
            None => PathBuf::from(path),
        },
    }
}

fn load_entries(path: &Path) -> Result<IndexMap<String, String>, SettingsStoreError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(IndexMap::new())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(IndexMap::new()),
        Err(error) => Err(SettingsStoreError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemoryStore::new();
        assert!(store.get("apiConfig").unwrap().is_none());

        store.set("refreshInterval", "15").unwrap();
        store.set("refreshInterval", "30").unwrap();
        assert_eq!(store.get("refreshInterval").unwrap().as_deref(), Some("30"));
    }

    #[test]
    fn json_store_persists_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = JsonFileStore::open(Some(path.clone())).unwrap();
        store.set("refreshInterval", "5").unwrap();
        store.set("apiConfig", r#"{"url":"https://api.example.com"}"#).unwrap();

        drop(store);
        let reloaded = JsonFileStore::open(Some(path)).unwrap();
        assert_eq!(reloaded.get("refreshInterval").unwrap().as_deref(), Some("5"));
        assert_eq!(
            reloaded.get("apiConfig").unwrap().as_deref(),
            Some(r#"{"url":"https://api.example.com"}"#)
        );
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(Some(dir.path().join("absent.json"))).unwrap();
        assert!(store.get("apiConfig").unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(Some(path)).unwrap();
        assert!(store.get("apiConfig").unwrap().is_none());
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/settings.json";
        temp_env::with_var(SETTINGS_PATH_ENV, Some(override_path), || {
            assert_eq!(default_settings_path(), expand_tilde(override_path));
        });
        temp_env::with_var(SETTINGS_PATH_ENV, Some("   "), || {
            assert_eq!(default_settings_path(), resttable_config_dir().join(SETTINGS_FILE_NAME));
        });
    }

    #[test]
    fn tilde_expansion_only_touches_the_prefix() {
        assert_eq!(expand_tilde("/etc/resttable.json"), PathBuf::from("/etc/resttable.json"));
        assert_eq!(expand_tilde("relative/~/path"), PathBuf::from("relative/~/path"));
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/a.json"), home.join("a.json"));
        }
    }
}
