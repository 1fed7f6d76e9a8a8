//! Output formatting for the built-in subcommands
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use volctl_core::{LoadFailure, PluginInfo, VolumeConfig};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
}

#[derive(Serialize)]
struct PluginReport<'a> {
    plugins: &'a [PluginInfo],
    failures: &'a [LoadFailure],
}

/// Format discovered plugins and load failures
pub fn format_plugins(
    plugins: &[PluginInfo],
    failures: &[LoadFailure],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&PluginReport {
            plugins,
            failures,
        })?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct PluginRow {
                #[tabled(rename = "Name")]
                name: String,
                #[tabled(rename = "Summary")]
                summary: String,
                #[tabled(rename = "Source")]
                source: String,
            }

            #[derive(Tabled)]
            struct FailureRow {
                #[tabled(rename = "Provider")]
                provider: String,
                #[tabled(rename = "Error")]
                error: String,
            }

            let mut output = String::new();
            if plugins.is_empty() {
                output.push_str(&"No plugins found/loaded".dimmed().to_string());
            } else {
                let rows = plugins.iter().map(|p| PluginRow {
                    name: p.name.cyan().to_string(),
                    summary: p.summary.clone(),
                    source: p.source.dimmed().to_string(),
                });
                let table = Table::new(rows).with(Style::rounded()).to_string();
                output.push_str(&format!("{}\n{}", "Plugins:".bold(), table));
            }

            if !failures.is_empty() {
                let rows = failures.iter().map(|f| FailureRow {
                    provider: f.provider.yellow().to_string(),
                    error: f.error.red().to_string(),
                });
                let table = Table::new(rows).with(Style::rounded()).to_string();
                output.push_str(&format!("\n{}\n{}", "Failed to load:".bold(), table));
            }

            Ok(output)
        }
    }
}

/// Format the resolved configuration
pub fn format_config(config: &VolumeConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct SettingRow {
                #[tabled(rename = "Setting")]
                key: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let plugin_dirs = config
                .plugin_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join("\n");

            let rows = vec![
                SettingRow {
                    key: "log_path".to_string(),
                    value: config.log_path.display().to_string(),
                },
                SettingRow {
                    key: "verbosity".to_string(),
                    value: config.verbosity.to_string(),
                },
                SettingRow {
                    key: "plugin_dirs".to_string(),
                    value: plugin_dirs,
                },
                SettingRow {
                    key: "category".to_string(),
                    value: config.category.clone(),
                },
            ];

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Configuration:".bold(), table))
        }
    }
}
