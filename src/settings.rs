//! JSON-backed key-value settings store and the persisted application settings.
//!
//! One namespace per (organization, application) pair, stored as a single JSON
//! object under the user's config directory. Absent files and absent keys read
//! as "no value"; only corrupted data is an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::search::DEFAULT_ENGINE;

const SETTINGS_KEY: &str = "settings";

/// Settings or bookmark persistence failure.
#[derive(Debug)]
pub enum PersistenceError {
    /// No user config directory on this platform.
    NoConfigDir,
    Read { path: PathBuf, message: String },
    Write { path: PathBuf, message: String },
    /// The stored data exists but does not decode.
    Corrupt { path: PathBuf, message: String },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::NoConfigDir => {
                write!(f, "no user config directory available")
            }
            PersistenceError::Read { path, message } => {
                write!(f, "cannot read settings {}: {}", path.display(), message)
            }
            PersistenceError::Write { path, message } => {
                write!(f, "cannot write settings {}: {}", path.display(), message)
            }
            PersistenceError::Corrupt { path, message } => {
                write!(f, "corrupt settings {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Key-value store persisted as one JSON object file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open the store for an (organization, application) namespace under the
    /// user's config directory.
    pub fn open(organization: &str, application: &str) -> Result<Self, PersistenceError> {
        let base = dirs::config_dir().ok_or(PersistenceError::NoConfigDir)?;
        let dir = base.join(organization);
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::Write {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: dir.join(format!("{}.json", application)),
        })
    }

    /// Store backed by an explicit file path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value. Missing file or missing key is `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let map = self.read_map()?;
        match map.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| PersistenceError::Corrupt {
                    path: self.path.clone(),
                    message: format!("key \"{}\": {}", key, e),
                }),
            None => Ok(None),
        }
    }

    /// Write a value synchronously (read-modify-write of the whole object).
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let mut map = self.read_map()?;
        let encoded = serde_json::to_value(value).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            message: format!("key \"{}\": {}", key, e),
        })?;
        map.insert(key.to_string(), encoded);
        self.write_map(&map)
    }

    /// Delete a key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, PersistenceError> {
        let mut map = self.read_map()?;
        let removed = map.remove(key).is_some();
        if removed {
            self.write_map(&map)?;
        }
        Ok(removed)
    }

    fn read_map(&self) -> Result<Map<String, Value>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| PersistenceError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::Write {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let encoded = serde_json::to_string_pretty(map).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, encoded).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// UI color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub search_engine: String,
    pub theme: Theme,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            search_engine: DEFAULT_ENGINE.to_string(),
            theme: Theme::default(),
        }
    }
}

impl AppSettings {
    /// Load from the store, defaulting when nothing was saved yet.
    pub fn load(store: &SettingsStore) -> Result<Self, PersistenceError> {
        Ok(store.get(SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, store: &SettingsStore) -> Result<(), PersistenceError> {
        store.set(SETTINGS_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::at_path(dir.path().join("browser.json"))
    }

    #[test]
    fn get_set_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("greeting", &"hello".to_string()).unwrap();
        assert_eq!(
            store.get::<String>("greeting").unwrap(),
            Some("hello".to_string())
        );
    }

    #[test]
    fn missing_file_and_key_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        assert_eq!(store.get::<String>("anything").unwrap(), None);
        store.set("present", &1_u32).unwrap();
        assert_eq!(store.get::<u32>("absent").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(
            store.get::<String>("anything"),
            Err(PersistenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn remove_deletes_only_the_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store.set("a", &1_u32).unwrap();
        store.set("b", &2_u32).unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.get::<u32>("b").unwrap(), Some(2));
    }

    #[test]
    fn app_settings_default_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        let loaded = AppSettings::load(&store).unwrap();
        assert_eq!(loaded.search_engine, DEFAULT_ENGINE);
        assert_eq!(loaded.theme, Theme::Light);

        let changed = AppSettings {
            search_engine: "Bing".to_string(),
            theme: Theme::Dark,
        };
        changed.save(&store).unwrap();
        assert_eq!(AppSettings::load(&store).unwrap(), changed);
    }
}
