use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    AGE_ADJUSTMENT, DATA_FILE_NAME, DEFAULT_ANALYZER_URL, FRAME_INTERVAL_MS, IMAGE_DIR_NAME,
    SYSTEM_FONT_CANDIDATES,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub data_file: PathBuf,
    pub image_dir: PathBuf,
    pub analyzer_url: String,
    pub age_adjustment: i64,
    pub frame_interval_ms: u64,
    pub font_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DATA_FILE_NAME),
            image_dir: PathBuf::from(IMAGE_DIR_NAME),
            analyzer_url: DEFAULT_ANALYZER_URL.to_string(),
            age_adjustment: AGE_ADJUSTMENT,
            frame_interval_ms: FRAME_INTERVAL_MS,
            font_path: None,
            request_timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    /// `<config_dir>/FaceCatalog/config.json`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCatalog").join("config.json"))
    }

    /// Reads an explicitly requested config file. Errors surface.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config at `explicit` if given, else the per-user default.
    ///
    /// A missing per-user file means defaults; a broken one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_err(std::io::Error::from(e)))?;
        fs::write(path, json).map_err(write_err)
    }

    /// The configured font, or the first system font that exists.
    pub fn resolve_font(&self) -> Option<PathBuf> {
        if let Some(path) = &self.font_path {
            return Some(path.clone());
        }
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.data_file, PathBuf::from("face_data.csv"));
        assert_eq!(config.image_dir, PathBuf::from("captured_faces"));
        assert_eq!(config.age_adjustment, -3);
        assert_eq!(config.frame_interval_ms, 20);
        assert!(config.font_path.is_none());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"age_adjustment": 0, "image_dir": "faces"}"#).unwrap();

        let config = CatalogConfig::from_file(&path).unwrap();
        assert_eq!(config.age_adjustment, 0);
        assert_eq!(config.image_dir, PathBuf::from("faces"));
        assert_eq!(config.data_file, PathBuf::from("face_data.csv"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = CatalogConfig {
            analyzer_url: "http://analyzer:9000".to_string(),
            font_path: Some(PathBuf::from("/fonts/a.ttf")),
            ..CatalogConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(CatalogConfig::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CatalogConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_unwritable_path_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();

        let err = CatalogConfig::default()
            .save(&blocker.join("config.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }));
        assert!(err.to_string().starts_with("failed to write config"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = CatalogConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_font_wins() {
        let config = CatalogConfig {
            font_path: Some(PathBuf::from("/custom.ttf")),
            ..CatalogConfig::default()
        };
        assert_eq!(config.resolve_font(), Some(PathBuf::from("/custom.ttf")));
    }
}
