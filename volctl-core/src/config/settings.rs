//! Resolved dispatcher configuration and its builder

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::paths::{default_config_path, default_log_path, default_plugin_dir};
use crate::error::ConfigError;
use crate::types::LogLevel;

/// Prefix shared by every environment variable the dispatcher reads or displays
pub const ENV_PREFIX: &str = "VOLCTL";
/// Overrides the log verbosity
pub const ENV_LOG: &str = "VOLCTL_LOG";
/// Overrides the log directory
pub const ENV_LOG_PATH: &str = "VOLCTL_LOG_PATH";
/// Replaces the plugin manifest directories (`:`-separated)
pub const ENV_PLUGIN_PATH: &str = "VOLCTL_PLUGIN_PATH";
/// Config file location, or `none` to skip loading one
pub const ENV_CONFIG: &str = "VOLCTL_CONFIG";

/// Registration category scanned for subcommand handlers
pub const DEFAULT_CATEGORY: &str = "volctl_handlers";

/// Configuration resolved once per run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumeConfig {
    /// Directory holding `volctl.log`
    pub log_path: PathBuf,

    /// Log verbosity
    pub verbosity: LogLevel,

    /// Directories scanned for plugin manifests
    pub plugin_dirs: Vec<PathBuf>,

    /// Registration category used for discovery
    pub category: String,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            verbosity: LogLevel::default(),
            plugin_dirs: vec![default_plugin_dir()],
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl VolumeConfig {
    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Full path of the log file inside `log_path`
    pub fn log_file(&self) -> PathBuf {
        self.log_path.join("volctl.log")
    }

    /// Config file location honoring `VOLCTL_CONFIG`; `None` when loading is disabled
    pub fn config_path() -> Option<PathBuf> {
        match std::env::var(ENV_CONFIG) {
            Ok(value) if value.eq_ignore_ascii_case("none") => None,
            Ok(value) if !value.is_empty() => Some(PathBuf::from(value)),
            _ => Some(default_config_path()),
        }
    }
}

/// On-disk representation; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    log_path: Option<PathBuf>,
    verbosity: Option<String>,
    plugin_dirs: Option<Vec<PathBuf>>,
    category: Option<String>,
}

/// Builder for [`VolumeConfig`] with validation and priority chain support
///
/// Each layer overrides the previous one, so apply them lowest first:
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. Global command-line flags
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    log_path: Option<PathBuf>,
    verbosity: Option<LogLevel>,
    plugin_dirs: Option<Vec<PathBuf>>,
    category: Option<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set log directory (with validation)
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        Self::validate_path("log_path", &path)?;
        self.log_path = Some(path);
        Ok(self)
    }

    /// Set verbosity from its textual name (with validation)
    pub fn with_verbosity(mut self, level: &str) -> Result<Self, ConfigError> {
        self.verbosity = Some(LogLevel::from_str(level)?);
        Ok(self)
    }

    /// Replace the plugin manifest directories
    pub fn with_plugin_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.plugin_dirs = Some(dirs);
        self
    }

    /// Set registration category (with validation)
    pub fn with_category(mut self, category: impl Into<String>) -> Result<Self, ConfigError> {
        let category = category.into();
        Self::validate_category(&category)?;
        self.category = Some(category);
        Ok(self)
    }

    /// Load values from a TOML file; a missing file leaves the builder untouched
    pub fn with_config_file(self, path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(self);
        };
        if !path.exists() {
            return Ok(self);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut builder = self;
        if let Some(log_path) = file.log_path {
            builder = builder.with_log_path(log_path)?;
        }
        if let Some(verbosity) = file.verbosity {
            builder = builder.with_verbosity(&verbosity)?;
        }
        if let Some(plugin_dirs) = file.plugin_dirs {
            builder = builder.with_plugin_dirs(plugin_dirs);
        }
        if let Some(category) = file.category {
            builder = builder.with_category(category)?;
        }
        Ok(builder)
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored so a stray variable never blocks `--help`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(ENV_LOG_PATH) {
            let path = PathBuf::from(path);
            if Self::validate_path("log_path", &path).is_ok() {
                self.log_path = Some(path);
            }
        }

        if let Ok(level) = std::env::var(ENV_LOG) {
            if let Ok(level) = LogLevel::from_str(&level) {
                self.verbosity = Some(level);
            }
        }

        if let Some(paths) = std::env::var_os(ENV_PLUGIN_PATH) {
            let dirs: Vec<PathBuf> = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            self.plugin_dirs = Some(dirs);
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<VolumeConfig, ConfigError> {
        let defaults = VolumeConfig::default();

        let log_path = self.log_path.unwrap_or(defaults.log_path);
        let category = self.category.unwrap_or(defaults.category);

        Self::validate_path("log_path", &log_path)?;
        Self::validate_category(&category)?;

        Ok(VolumeConfig {
            log_path,
            verbosity: self.verbosity.unwrap_or(defaults.verbosity),
            plugin_dirs: self.plugin_dirs.unwrap_or(defaults.plugin_dirs),
            category,
        })
    }

    fn validate_path(field: &'static str, path: &Path) -> Result<(), ConfigError> {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field,
                reason: "path cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    fn validate_category(category: &str) -> Result<(), ConfigError> {
        if category.is_empty() || category.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "category",
                reason: format!("'{}' must be a single non-empty word", category),
            });
        }
        Ok(())
    }
}
