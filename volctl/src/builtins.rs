//! Built-in subcommands
//!
//! Registered before discovery, so a plugin with the same name replaces them.

use async_trait::async_trait;
use clap::error::ErrorKind;
use clap::Parser;
use std::sync::Arc;

use volctl_core::{
    CommandError, DispatchContext, ExitStatus, Handler, HandlerEntry, HandlerSource, Result,
};

use crate::format::{format_config, format_plugins, OutputFormat};

/// Parse built-in arguments with clap
///
/// Returns `None` when clap printed help or version output itself.
fn parse_args<T: Parser>(name: &str, args: &[String]) -> Result<Option<T>> {
    let argv = std::iter::once(format!("volctl {}", name)).chain(args.iter().cloned());
    match T::try_parse_from(argv) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e.render());
            Ok(None)
        }
        Err(e) => Err(CommandError::expected(e.render().to_string().trim_end())),
    }
}

/// List discovered plugins and load failures
#[derive(Parser, Debug)]
#[command(about = "List discovered plugins and load failures")]
struct PluginsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// Show the resolved configuration
#[derive(Parser, Debug)]
#[command(about = "Show the resolved configuration")]
struct ConfigArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// `volctl plugins`
pub struct PluginsCommand;

#[async_trait]
impl Handler for PluginsCommand {
    async fn invoke(&self, ctx: &DispatchContext, args: &[String]) -> Result<ExitStatus> {
        let Some(args) = parse_args::<PluginsArgs>("plugins", args)? else {
            return Ok(ExitStatus::SUCCESS);
        };
        println!("{}", format_plugins(&ctx.plugins, &ctx.failures, args.format)?);
        Ok(ExitStatus::SUCCESS)
    }

    fn help_summary(&self) -> &str {
        "List discovered plugins and load failures"
    }
}

/// `volctl config`
pub struct ConfigCommand;

#[async_trait]
impl Handler for ConfigCommand {
    async fn invoke(&self, ctx: &DispatchContext, args: &[String]) -> Result<ExitStatus> {
        let Some(args) = parse_args::<ConfigArgs>("config", args)? else {
            return Ok(ExitStatus::SUCCESS);
        };
        println!("{}", format_config(&ctx.config, args.format)?);
        Ok(ExitStatus::SUCCESS)
    }

    fn help_summary(&self) -> &str {
        "Show the resolved configuration"
    }
}

/// Entries registered before discovery
pub fn entries() -> Vec<HandlerEntry> {
    vec![
        HandlerEntry::new("config", Arc::new(ConfigCommand), HandlerSource::Builtin),
        HandlerEntry::new("plugins", Arc::new(PluginsCommand), HandlerSource::Builtin),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_entries_are_builtin() {
        let entries = entries();
        let names: Vec<&str> = entries.iter().map(HandlerEntry::name).collect();
        assert_eq!(names, vec!["config", "plugins"]);
        assert!(entries
            .iter()
            .all(|e| e.source() == &HandlerSource::Builtin && !e.help_summary().is_empty()));
    }

    #[test]
    fn test_parse_args_format() {
        let parsed = parse_args::<PluginsArgs>("plugins", &args(&["--format", "json"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.format, OutputFormat::Json);

        let parsed = parse_args::<ConfigArgs>("config", &[]).unwrap().unwrap();
        assert_eq!(parsed.format, OutputFormat::Table);
    }

    #[test]
    fn test_parse_args_help_is_not_an_error() {
        let parsed = parse_args::<PluginsArgs>("plugins", &args(&["--help"])).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_parse_args_bad_value_is_expected_failure() {
        let err = parse_args::<PluginsArgs>("plugins", &args(&["--format", "xml"])).unwrap_err();
        assert!(matches!(err, CommandError::Expected(_)));
        assert!(err.to_string().contains("xml"));
    }

    #[tokio::test]
    async fn test_plugins_command_runs() {
        let ctx = DispatchContext::default();
        let status = PluginsCommand
            .invoke(&ctx, &args(&["--format", "json"]))
            .await
            .unwrap();
        assert!(status.is_success());
    }

    #[tokio::test]
    async fn test_config_command_rejects_unknown_flag() {
        let ctx = DispatchContext::default();
        let err = ConfigCommand
            .invoke(&ctx, &args(&["--verbose"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Expected(_)));
    }
}
