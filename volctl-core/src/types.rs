//! Core types shared by the dispatcher and handlers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Process exit status produced by a dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitStatus(u8);

impl ExitStatus {
    /// Help, version, or successful handler completion
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    /// A caught expected failure
    pub const FAILURE: ExitStatus = ExitStatus(1);
    /// No subcommand matched
    pub const USAGE: ExitStatus = ExitStatus(2);
    /// The run was interrupted (128 + SIGINT)
    pub const INTERRUPTED: ExitStatus = ExitStatus(130);

    /// Wrap a raw exit code
    pub const fn new(code: u8) -> Self {
        ExitStatus(code)
    }

    /// Map a child process code; codes outside `0..=255` become [`ExitStatus::FAILURE`]
    pub fn from_code(code: i32) -> Self {
        u8::try_from(code).map(ExitStatus).unwrap_or(ExitStatus::FAILURE)
    }

    /// Raw exit code
    pub fn code(self) -> u8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        ExitStatus::SUCCESS
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.0)
    }
}

/// Log verbosity accepted by `--log` / `--logging`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    ///
    /// `critical` has no tracing counterpart and collapses onto `error`.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    /// Parse a verbosity name
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use volctl_core::LogLevel;
    ///
    /// assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
    /// assert_eq!(LogLevel::from_str("WARNING").unwrap(), LogLevel::Warning);
    /// assert!(LogLevel::from_str("verbose").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}
