//! Configuration file support for VBAT.
//!
//! Settings are stored as JSON. Every section has defaults, so a partial or
//! missing file is fine. A few settings can be overridden from the
//! environment (after `.env` has been loaded by the binary).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BUCKET_EPSILON, DEFAULT_ANNOTATIONS_FILE, DEFAULT_BACKUP_FOLDER, DEFAULT_CLASS_CONFIG_FILE,
    DEFAULT_VIDEO_FOLDER, MIN_BOX_SIZE,
};
use crate::session::AnnotatorSession;
use crate::timeline::TimeBucketIndex;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Parse a level name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Where annotations, videos and dataset inputs live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Annotation behavior
    #[serde(default)]
    pub annotation: AnnotationSettings,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the annotation collection
    pub annotations_file: PathBuf,
    /// Folder scanned for videos
    pub video_folder: PathBuf,
    /// Class list used by dataset export
    pub class_config_file: PathBuf,
    /// Folder for annotation backups taken before export
    pub backup_folder: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            annotations_file: PathBuf::from(DEFAULT_ANNOTATIONS_FILE),
            video_folder: PathBuf::from(DEFAULT_VIDEO_FOLDER),
            class_config_file: PathBuf::from(DEFAULT_CLASS_CONFIG_FILE),
            backup_folder: PathBuf::from(DEFAULT_BACKUP_FOLDER),
        }
    }
}

/// Bucketing and drawing thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Timestamps closer than this (seconds) share a bucket
    pub bucket_epsilon: f64,
    /// Minimum side of a drawn box in display pixels
    pub min_box_size: f64,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            bucket_epsilon: BUCKET_EPSILON,
            min_box_size: MIN_BOX_SIZE,
        }
    }
}

impl AnnotationSettings {
    pub fn bucket_index(&self) -> TimeBucketIndex {
        TimeBucketIndex::new(self.bucket_epsilon)
    }

    /// A fresh session using these thresholds.
    pub fn session(&self) -> AnnotatorSession {
        AnnotatorSession::new(self.bucket_index(), self.min_box_size)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            storage: StorageConfig::default(),
            annotation: AnnotationSettings::default(),
        }
    }

    /// Serialize configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default config file name.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("vbat").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("vbat")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}, using defaults", path);
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Apply `UPLOAD_FOLDER`, `ANNOTATIONS_FILE` and `VBAT_LOG_LEVEL`.
    ///
    /// `lookup` resolves a variable name, normally `std::env::var(..).ok()`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(folder) = lookup("UPLOAD_FOLDER").filter(|v| !v.is_empty()) {
            self.storage.video_folder = PathBuf::from(folder);
        }
        if let Some(file) = lookup("ANNOTATIONS_FILE").filter(|v| !v.is_empty()) {
            self.storage.annotations_file = PathBuf::from(file);
        }
        if let Some(level) = lookup("VBAT_LOG_LEVEL") {
            match LogLevel::parse(&level) {
                Some(level) => self.preferences.log_level = level,
                None => log::warn!("Ignoring unknown VBAT_LOG_LEVEL '{}'", level),
            }
        }
    }
}

/// Errors that can occur when handling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.annotation.bucket_epsilon, 0.1);
        assert_eq!(config.annotation.min_box_size, 5.0);
        assert_eq!(config.storage.annotations_file, PathBuf::from("annotations.json"));
        assert_eq!(config.preferences.log_level, LogLevel::Info);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config =
            AppConfig::from_json(r#"{"version": 1, "annotation": {"bucket_epsilon": 0.25}}"#)
                .unwrap();
        assert_eq!(config.annotation.bucket_epsilon, 0.25);
        assert_eq!(config.annotation.min_box_size, MIN_BOX_SIZE);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_version_too_new() {
        let result = AppConfig::from_json(r#"{"version": 99}"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
        assert_eq!(
            AppConfig::load(&dir.path().join("missing.json")).unwrap(),
            AppConfig::new()
        );
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("UPLOAD_FOLDER", "media"),
            ("ANNOTATIONS_FILE", "data/labels.json"),
            ("VBAT_LOG_LEVEL", "TRACE"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::new();
        config.apply_env_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.video_folder, PathBuf::from("media"));
        assert_eq!(
            config.storage.annotations_file,
            PathBuf::from("data/labels.json")
        );
        assert_eq!(config.preferences.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_settings_build_session() {
        let settings = AnnotationSettings {
            bucket_epsilon: 0.5,
            min_box_size: 2.0,
        };
        assert_eq!(settings.bucket_index().epsilon(), 0.5);
        assert!(!settings.session().annotation_mode());
    }
}
