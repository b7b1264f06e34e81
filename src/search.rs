//! Search-engine directory: named base URLs for home pages and query URLs.
//!
//! Loaded once from a JSON resource (`{"Google": "https://www.google.com", ...}`)
//! and read-only afterwards, so shared references are safe across callers.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Engine consulted when the configured engine is missing from the directory.
pub const DEFAULT_ENGINE: &str = "Google";

/// Search-engine configuration failure.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration resource could not be read.
    Read { path: PathBuf, message: String },
    /// The resource was not a JSON object of name/URL string pairs.
    Parse { path: PathBuf, message: String },
    /// Neither the requested engine nor the default entry exists.
    EngineUnavailable { requested: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => {
                write!(f, "cannot read engine config {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid engine config {}: {}", path.display(), message)
            }
            ConfigError::EngineUnavailable { requested } => {
                write!(
                    f,
                    "no URL for engine \"{}\" and no \"{}\" fallback entry",
                    requested, DEFAULT_ENGINE
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Mapping of engine name to base URL.
#[derive(Debug, Clone)]
pub struct SearchDirectory {
    engines: BTreeMap<String, String>,
}

impl SearchDirectory {
    /// Parse a JSON configuration file into a directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&raw, path)
    }

    /// Parse an in-memory JSON string into a directory.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::parse(json, Path::new("<inline>"))
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let engines: BTreeMap<String, String> =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Self { engines })
    }

    /// Compiled-in directory used when no configuration file is present.
    pub fn builtin() -> Self {
        let engines = [
            (DEFAULT_ENGINE, "https://www.google.com"),
            ("Bing", "https://www.bing.com"),
            ("DuckDuckGo", "https://www.duckduckgo.com"),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();
        Self { engines }
    }

    /// Base URL for `active_name`, falling back to the default entry when the
    /// name is unknown.
    pub fn resolve(&self, active_name: &str) -> Result<&str, ConfigError> {
        self.engines
            .get(active_name)
            .or_else(|| self.engines.get(DEFAULT_ENGINE))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::EngineUnavailable {
                requested: active_name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Engine names in listing order (alphabetical).
    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

/// Query URL for `query` against an engine's base URL.
///
/// Empty queries are not rejected here; callers filter them first.
pub fn build_search_url(base_url: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}/search?q={}", base_url, encoded)
}

/// Home-page URL for an engine's base URL. Currently the base URL itself.
pub fn build_navigation_url(base_url: &str) -> String {
    base_url.to_string()
}
