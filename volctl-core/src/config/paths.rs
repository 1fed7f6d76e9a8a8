//! Default path resolution for configuration, plugins, and logs
//!
//! Follows the XDG base directories when available, with system fallbacks.

use std::path::PathBuf;

/// Returns the default path for the configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/volctl/config.toml`
/// - Fallback: `/etc/volctl/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("volctl")
        .join("config.toml")
}

/// Returns the default directory scanned for plugin manifests.
///
/// - Linux/macOS: `~/.config/volctl/plugins.d`
/// - Fallback: `/etc/volctl/plugins.d`
pub fn default_plugin_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("volctl")
        .join("plugins.d")
}

/// Returns the default directory for log files.
pub fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/volctl")
}
