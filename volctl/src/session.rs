//! One dispatcher run, from raw argv to a dispatch outcome

use std::path::PathBuf;
use tracing::{debug, warn};

use volctl_core::{
    CommandError, ConfigBuilder, ConfigError, DispatchContext, HandlerEntry, Provider,
    VolumeConfig,
};

use crate::dispatcher::{Dispatcher, Mapper, Outcome};
use crate::help::{self, EnvironmentOverlay};
use crate::prescan::{self, GlobalOptions};
use crate::registry::ExtensionRegistry;
use crate::{builtins, logging};

/// Configuration resolved for one run
#[derive(Debug)]
pub struct ResolvedConfig {
    pub config: VolumeConfig,
    /// Config file that was skipped because it could not be used
    pub skipped_file: Option<ConfigError>,
}

/// Build the configuration from defaults, config file, environment, then global flags
///
/// An unusable config file is dropped as a whole and reported in
/// `skipped_file`. Invalid global flags are errors.
pub fn resolve_config(globals: &GlobalOptions) -> Result<ResolvedConfig, CommandError> {
    let config_path = VolumeConfig::config_path();
    let (builder, skipped_file) = match ConfigBuilder::new().with_config_file(config_path.as_deref())
    {
        Ok(builder) => (builder, None),
        Err(e) => (ConfigBuilder::new(), Some(e)),
    };
    let mut builder = builder.with_env_overrides();

    if let Some(level) = globals.get(prescan::LOG.canonical) {
        builder = builder.with_verbosity(level)?;
    }
    if let Some(path) = globals.get(prescan::LOG_PATH.canonical) {
        builder = builder.with_log_path(PathBuf::from(path))?;
    }

    Ok(ResolvedConfig {
        config: builder.build()?,
        skipped_file,
    })
}

/// Everything needed to dispatch, built once per process
#[derive(Debug)]
pub struct Session {
    pub dispatcher: Dispatcher,
    pub context: DispatchContext,
}

impl Session {
    /// Pre-scan, configure logging, discover plugins, and compose help
    pub fn prepare(
        argv: &[String],
        providers: Vec<Box<dyn Provider>>,
    ) -> Result<Self, CommandError> {
        let globals = prescan::extract(argv, prescan::GLOBAL_OPTIONS);
        let ResolvedConfig {
            config,
            skipped_file,
        } = resolve_config(&globals)?;
        let target = logging::setup(&config);
        debug!("Logging to {:?} at level {}", target, config.verbosity);
        if let Some(err) = skipped_file {
            warn!("Ignoring config file: {}", err);
        }

        Ok(Self::with_config(globals.into_remaining(), config, providers))
    }

    /// Assemble a session from an already resolved configuration
    ///
    /// `argv` is the argument list after the program name with global
    /// options removed.
    pub fn with_config(
        argv: Vec<String>,
        config: VolumeConfig,
        providers: Vec<Box<dyn Provider>>,
    ) -> Self {
        let registry = ExtensionRegistry::new(config.plugin_dirs.clone()).with_providers(providers);
        let discovery = registry.discover(&config.category);

        let plugins = discovery.entries.iter().map(HandlerEntry::info).collect();
        let failures = discovery.failures.clone();

        let mut mapper = Mapper::new();
        mapper.extend(builtins::entries());
        mapper.extend(discovery.into_entries());

        let help = help::compose(
            help::VERSION,
            &config,
            &mapper,
            &EnvironmentOverlay::from_env(),
        );

        Self {
            dispatcher: Dispatcher::new(mapper, help::USAGE),
            context: DispatchContext {
                config,
                argv,
                help,
                version: help::VERSION.to_string(),
                plugins,
                failures,
            },
        }
    }

    pub async fn dispatch(&self) -> Result<Outcome, CommandError> {
        self.dispatcher.dispatch(&self.context).await
    }
}
