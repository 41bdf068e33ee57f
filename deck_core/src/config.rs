//! # Service Configuration
//!
//! Settings shared by the CLI and the server. Values come from, in
//! increasing priority: built-in defaults, an optional `deckwise.toml`,
//! `DECKWISE_*` environment variables, then command-line flags.
//!
//! ## Example
//!
//! ```rust
//! use deck_core::config::ServiceConfig;
//!
//! let config = ServiceConfig::from_toml_str("data_dir = \"/srv/deck\"").unwrap();
//! assert_eq!(config.environment_csv().to_str(), Some("/srv/deck/environment_table.csv"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DeckError, DeckResult};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "deckwise.toml";

pub const ENV_DATA_DIR: &str = "DECKWISE_DATA_DIR";
pub const ENV_STORE: &str = "DECKWISE_STORE";
pub const ENV_BIND: &str = "DECKWISE_BIND";

const ENVIRONMENT_CSV: &str = "environment_table.csv";
const MATERIALS_CSV: &str = "materials.csv";
const STORE_FILE: &str = "reference.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory holding the source CSV exports
    pub data_dir: PathBuf,
    /// Reference store file; defaults to `<data_dir>/reference.json`
    pub store_path: Option<PathBuf>,
    /// Server listen address
    pub bind: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            data_dir: PathBuf::from("data"),
            store_path: None,
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> DeckResult<Self> {
        toml::from_str(text).map_err(|e| DeckError::config("toml", e.to_string()))
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> DeckResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DeckError::file_error("read", path.display().to_string(), e.to_string()))?;
        toml::from_str(&text).map_err(|e| DeckError::config(path.display().to_string(), e.to_string()))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `deckwise.toml` is used
    /// if present. Environment overrides are applied either way.
    pub fn load(path: Option<&Path>) -> DeckResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `DECKWISE_*` overrides from a variable lookup. Blank values
    /// are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = value(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(store) = value(ENV_STORE) {
            self.store_path = Some(PathBuf::from(store));
        }
        if let Some(bind) = value(ENV_BIND) {
            self.bind = bind;
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(STORE_FILE))
    }

    /// Default environment table path
    pub fn environment_csv(&self) -> PathBuf {
        self.data_dir.join(ENVIRONMENT_CSV)
    }

    /// Default materials table path
    pub fn materials_csv(&self) -> PathBuf {
        self.data_dir.join(MATERIALS_CSV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.store_path(), PathBuf::from("data/reference.json"));
        assert_eq!(config.environment_csv(), PathBuf::from("data/environment_table.csv"));
        assert_eq!(config.materials_csv(), PathBuf::from("data/materials.csv"));
        assert_eq!(config.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServiceConfig::from_toml_str("bind = \"0.0.0.0:9000\"").unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let err = ServiceConfig::from_toml_str("port = 8000").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_DATA_DIR, "/srv/deck"), (ENV_BIND, "  "), (ENV_STORE, "/var/lib/deck.json")]
            .into_iter()
            .collect();
        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/srv/deck"));
        assert_eq!(config.store_path(), PathBuf::from("/var/lib/deck.json"));
        // blank override ignored
        assert_eq!(config.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deckwise.toml");
        fs::write(&path, "data_dir = \"exports\"\nstore_path = \"exports/store.json\"\n").unwrap();
        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("exports/store.json"));

        let missing = ServiceConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");
    }
}
