//! Store configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Default record file name prefix
pub const DEFAULT_RECORD_PREFIX: &str = "survey_responses";

/// Default shared log file name
pub const DEFAULT_LOG_FILE_NAME: &str = "all_survey_responses.csv";

/// Default branding image path
pub const DEFAULT_LOGO_PATH: &str = "logo.png";

/// Where and how submissions are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory receiving record files and the shared log
    pub output_dir: PathBuf,
    /// Prefix of every record file name
    pub record_prefix: String,
    /// File name of the shared log, inside `output_dir`
    pub log_file_name: String,
    /// Optional branding image
    pub logo_path: PathBuf,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// With record prefix
    #[inline]
    #[must_use]
    pub fn with_record_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.record_prefix = prefix.into();
        self
    }

    /// With log file name
    #[inline]
    #[must_use]
    pub fn with_log_file_name(mut self, name: impl Into<String>) -> Self {
        self.log_file_name = name.into();
        self
    }

    /// With branding image path
    #[inline]
    #[must_use]
    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = path.into();
        self
    }

    /// Full path of the shared log
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file_name)
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] for invalid TOML or invalid values
    pub fn from_toml_str(raw: &str) -> Result<Self, StoreError> {
        let config: Self = toml::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Check names are usable as plain file names
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] describing the first bad value
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.record_prefix.trim().is_empty() {
            return Err(StoreError::Config("record_prefix must not be empty".into()));
        }
        if self.log_file_name.trim().is_empty() {
            return Err(StoreError::Config("log_file_name must not be empty".into()));
        }
        for (field, value) in [
            ("record_prefix", &self.record_prefix),
            ("log_file_name", &self.log_file_name),
        ] {
            if value.contains(['/', '\\']) {
                return Err(StoreError::Config(format!(
                    "{field} must be a plain file name, got {value:?}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            record_prefix: DEFAULT_RECORD_PREFIX.to_string(),
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::new();
        assert_eq!(config.record_prefix, "survey_responses");
        assert_eq!(config.log_path(), PathBuf::from("./all_survey_responses.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str("output_dir = \"data\"\n").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.log_file_name, DEFAULT_LOG_FILE_NAME);
    }

    #[test]
    fn rejects_path_in_file_name() {
        let err = StoreConfig::from_toml_str("log_file_name = \"../escape.csv\"\n").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
        assert!(StoreConfig::new().with_record_prefix(" ").validate().is_err());
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            StoreConfig::from_toml_str("output_dir = ["),
            Err(StoreError::Config(_))
        ));
    }
}
