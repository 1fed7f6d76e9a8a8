//! Error types for the volctl dispatcher

use std::path::PathBuf;
use thiserror::Error;

/// Failure raised while running a subcommand.
///
/// Only [`CommandError::Expected`] and [`CommandError::Interrupted`] are
/// intercepted at the process boundary. Everything else travels as
/// [`CommandError::Unexpected`] and surfaces with its full cause chain.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A known failure the user can act on (bad precondition, invalid input)
    #[error("{0}")]
    Expected(String),

    /// The user aborted the run
    #[error("Aborted")]
    Interrupted,

    /// Anything the handler did not anticipate
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl CommandError {
    /// Build an expected failure from any displayable message
    pub fn expected(message: impl Into<String>) -> Self {
        CommandError::Expected(message.into())
    }

    /// Whether the boundary converts this failure into a clean exit
    pub fn is_caught(&self) -> bool {
        matches!(self, CommandError::Expected(_) | CommandError::Interrupted)
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Expected(err.to_string())
    }
}

/// Result type alias for subcommand execution
pub type Result<T> = std::result::Result<T, CommandError>;

/// Failure to materialize a single extension provider
#[derive(Error, Debug)]
pub enum LoadError {
    /// Manifest could not be parsed
    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// Registration name is unusable as a dispatch key
    #[error("Invalid handler name '{0}'")]
    InvalidName(String),

    /// Declared entry point does not resolve to an executable
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// A compiled-in provider refused to load
    #[error("Provider error: {0}")]
    Provider(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Unknown verbosity level
    #[error("Invalid log level '{0}'. Acceptable values: debug, info, warning, error, critical")]
    InvalidLogLevel(String),

    /// A field value failed validation
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}
