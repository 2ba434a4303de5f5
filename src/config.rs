use crate::error::Result;
use crate::storage::JsonFileStore;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const APP_DIR: &str = "comissio";
const FALLBACK_DATA_DIR: &str = ".comissio";

pub const ENV_DATA_DIR: &str = "COMISSIO_DATA_DIR";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub data_dir: PathBuf,
    pub gemini_model: String,
    /// Read from the file or the environment, never written back.
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_api_key: None,
        }
    }
}

impl TrackerConfig {
    /// Defaults when `path` doesn't exist; an error when it can't be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(model) = lookup(ENV_GEMINI_MODEL) {
            self.gemini_model = model;
        }
        if let Some(key) = lookup(ENV_GEMINI_API_KEY) {
            self.gemini_api_key = Some(key);
        }
        self
    }

    pub fn open_store(&self) -> Result<JsonFileStore> {
        JsonFileStore::new(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = TrackerConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert!(config.data_dir.ends_with("comissio") || config.data_dir.ends_with(".comissio"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(TrackerConfig::load(&path).is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"gemini_model": "gemini-pro", "gemini_api_key": "k"}"#).unwrap();

        let config = TrackerConfig::load(&path).unwrap();
        assert_eq!(config.gemini_model, "gemini-pro");
        assert_eq!(config.gemini_api_key.as_deref(), Some("k"));
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn test_save_omits_api_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = TrackerConfig {
            data_dir: dir.path().join("data"),
            gemini_model: "gemini-pro".into(),
            gemini_api_key: Some("secret".into()),
        };

        config.save(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret"));

        let reloaded = TrackerConfig::load(&path).unwrap();
        assert_eq!(reloaded.data_dir, config.data_dir);
        assert_eq!(reloaded.gemini_api_key, None);
    }

    #[test]
    fn test_overrides_skip_blank_values() {
        let config = TrackerConfig::default().apply_overrides(|key| match key {
            ENV_DATA_DIR => Some("/tmp/comissio-test".to_string()),
            ENV_GEMINI_MODEL => Some("  ".to_string()),
            ENV_GEMINI_API_KEY => Some("abc".to_string()),
            _ => None,
        });

        assert_eq!(config.data_dir, PathBuf::from("/tmp/comissio-test"));
        assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_open_store_creates_data_dir() {
        let dir = tempdir().unwrap();
        let config = TrackerConfig {
            data_dir: dir.path().join("slots"),
            ..TrackerConfig::default()
        };
        let store = config.open_store().unwrap();
        assert!(store.dir().is_dir());
    }
}
