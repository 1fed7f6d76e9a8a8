//! Plugin manifests
//!
//! A manifest registers an external executable as a subcommand handler:
//!
//! ```toml
//! name = "lvm"
//! category = "volctl_handlers"
//! command = "volctl-lvm"
//! args = ["--from-dispatcher"]
//! help = "Use LVM and LVM-based technologies to deploy OSDs"
//! ```
//!
//! `command` is either a bare program name searched on `PATH`, or a path.
//! Relative paths are resolved against the manifest's directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use volctl_core::config::DEFAULT_CATEGORY;
use volctl_core::{Handler, LoadError, Provider};

use super::external::{resolve_command, ExternalCommand};

/// File extension recognized in plugin directories
pub const MANIFEST_EXTENSION: &str = "toml";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Parsed manifest contents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    /// Dispatch key
    pub name: String,

    /// Registration category
    #[serde(default = "default_category")]
    pub category: String,

    /// Program to execute
    pub command: String,

    /// Arguments placed before the caller's arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// One-line help summary
    #[serde(default)]
    pub help: String,
}

impl PluginManifest {
    /// Parse manifest text; `path` is only used for error reporting
    pub fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
        toml::from_str(content).map_err(|e| LoadError::Manifest {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Check the name is usable as a dispatch key
    pub fn validate(&self) -> Result<(), LoadError> {
        if !is_valid_name(&self.name) {
            return Err(LoadError::InvalidName(self.name.clone()));
        }
        if self.command.trim().is_empty() {
            return Err(LoadError::CommandNotFound(self.command.clone()));
        }
        Ok(())
    }
}

/// Names must be a single token that cannot be mistaken for a flag
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.chars().any(char::is_whitespace)
}

/// Provider backed by a manifest on disk
#[derive(Debug, Clone)]
pub struct ManifestProvider {
    manifest: PluginManifest,
    path: PathBuf,
}

impl ManifestProvider {
    pub fn new(manifest: PluginManifest, path: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            path: path.into(),
        }
    }

    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl Provider for ManifestProvider {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn category(&self) -> &str {
        &self.manifest.category
    }

    fn load(&self) -> Result<Arc<dyn Handler>, LoadError> {
        self.manifest.validate()?;
        let program = resolve_command(&self.manifest.command, self.base_dir())?;

        Ok(Arc::new(ExternalCommand::new(
            &self.manifest.name,
            program,
            self.manifest.args.clone(),
            &self.manifest.help,
        )))
    }
}
