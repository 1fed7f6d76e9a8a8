//! Help text composition

use std::fmt::Write;

use volctl_core::config::{default_log_path, ENV_PREFIX};
use volctl_core::VolumeConfig;

use crate::dispatcher::Mapper;

/// Placeholder shown when discovery produced nothing
pub const NO_PLUGINS: &str = "No plugins found/loaded";

/// Release identifier
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-line usage shown with unknown-command errors
pub const USAGE: &str =
    "usage: volctl [--log LEVEL] [--log-path DIR] <subcommand> [args...]\n\
     Run 'volctl --help' for the list of subcommands.";

/// Environment variables sharing the reserved prefix, for display only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverlay {
    vars: Vec<(String, String)>,
}

impl EnvironmentOverlay {
    /// Snapshot the process environment; non-UTF-8 entries are skipped
    pub fn from_env() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(vars, ENV_PREFIX)
    }

    /// Keep the pairs whose key starts with `prefix`, sorted by key
    pub fn from_vars<I>(vars: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: Vec<_> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();
        vars.sort();
        Self { vars }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `Environ Variables:` block, or an empty string when nothing matched
    pub fn render(&self) -> String {
        if self.vars.is_empty() {
            return String::new();
        }
        let mut lines = vec!["Environ Variables:".to_string()];
        lines.extend(self.vars.iter().map(|(k, v)| format!("{}={}", k, v)));
        lines.join("\n")
    }
}

/// Plugin section: one padded line per plugin, or the placeholder
pub fn plugin_help(mapper: &Mapper) -> String {
    let lines: Vec<String> = mapper
        .plugins()
        .map(|entry| format!("{:<19} {}\n", entry.name(), entry.help_summary()))
        .collect();
    if lines.is_empty() {
        NO_PLUGINS.to_string()
    } else {
        lines.join("\n")
    }
}

fn builtin_help(mapper: &Mapper) -> String {
    let mut out = String::new();
    for entry in mapper.builtins() {
        let _ = writeln!(out, "{:<19} {}", entry.name(), entry.help_summary());
    }
    out
}

/// Compose the full help text
pub fn compose(
    version: &str,
    config: &VolumeConfig,
    mapper: &Mapper,
    overlay: &EnvironmentOverlay,
) -> String {
    format!(
        "
volctl: Dispatch storage volume provisioning subcommands to pluggable
handlers

Version: {version}

Global Options:
--log, --logging    Set the level of logging. Acceptable values:
                    debug, warning, error, critical
--log-path          Change the default location ('{default_log_path}') for logging

Log Path: {log_path}

Subcommands:
{builtins}{plugins}

{environ}
    ",
        version = version,
        default_log_path = default_log_path().display(),
        log_path = config.log_path.display(),
        builtins = builtin_help(mapper),
        plugins = plugin_help(mapper),
        environ = overlay.render(),
    )
}
