//! Handler and provider contracts
//!
//! A [`Handler`] executes one subcommand. A [`Provider`] is a registration
//! that can materialize a handler on demand; discovery calls
//! [`Provider::load`] once per provider and stamps the result with the
//! provider's registered name.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::VolumeConfig;
use crate::error::{LoadError, Result};
use crate::types::ExitStatus;

/// Executable side of a subcommand
#[async_trait]
pub trait Handler: Send + Sync {
    /// Run the subcommand with the arguments that follow its name
    async fn invoke(&self, ctx: &DispatchContext, args: &[String]) -> Result<ExitStatus>;

    /// One-line summary shown next to the name in help output
    fn help_summary(&self) -> &str {
        ""
    }
}

/// A registration under a category that can produce a [`Handler`]
pub trait Provider: Send + Sync {
    /// Registered name, used as the dispatch key
    fn name(&self) -> &str;

    /// Category the provider registered under
    fn category(&self) -> &str;

    /// Materialize the handler
    ///
    /// A panic here is recorded as a load failure like any returned error.
    fn load(&self) -> std::result::Result<Arc<dyn Handler>, LoadError>;
}

/// Where a handler entry came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerSource {
    /// Shipped with the dispatcher itself
    Builtin,
    /// Compiled-in provider supplied by the embedding binary
    Compiled,
    /// Runtime manifest on disk
    Manifest(PathBuf),
}

impl fmt::Display for HandlerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSource::Builtin => f.write_str("builtin"),
            HandlerSource::Compiled => f.write_str("compiled"),
            HandlerSource::Manifest(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A handler bound to its dispatch name
#[derive(Clone)]
pub struct HandlerEntry {
    name: String,
    handler: Arc<dyn Handler>,
    help_summary: String,
    source: HandlerSource,
}

impl HandlerEntry {
    /// Create an entry; the summary is taken from the handler
    pub fn new(name: impl Into<String>, handler: Arc<dyn Handler>, source: HandlerSource) -> Self {
        let help_summary = handler.help_summary().to_string();
        Self {
            name: name.into(),
            handler,
            help_summary,
            source,
        }
    }

    /// Replace the help summary
    pub fn with_help_summary(mut self, summary: impl Into<String>) -> Self {
        self.help_summary = summary.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn help_summary(&self) -> &str {
        &self.help_summary
    }

    pub fn source(&self) -> &HandlerSource {
        &self.source
    }

    /// Serializable description for listings
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: self.name.clone(),
            summary: self.help_summary.clone(),
            source: self.source.to_string(),
        }
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("help_summary", &self.help_summary)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Listing row for a discovered plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub summary: String,
    pub source: String,
}

/// A provider that failed to load during discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Provider identity (name or manifest path)
    pub provider: String,
    pub error: String,
}

/// State handed to a handler for a single run
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    /// Resolved configuration
    pub config: VolumeConfig,

    /// Arguments after the program name with global flags removed
    pub argv: Vec<String>,

    /// Composed help text
    pub help: String,

    /// Release identifier
    pub version: String,

    /// Discovered plugins, sorted by name
    pub plugins: Vec<PluginInfo>,

    /// Providers that failed to load
    pub failures: Vec<LoadFailure>,
}
