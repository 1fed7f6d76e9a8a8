//! Extension registry
//!
//! Discovers subcommand handlers registered under a category. Two kinds of
//! providers take part in a discovery pass:
//! - compiled-in [`Provider`]s handed over by the embedding binary
//! - manifest files found in the configured plugin directories
//!
//! A provider that fails to load, or panics while loading, is logged,
//! recorded in [`Discovery::failures`], and skipped. The pass always
//! completes.

mod external;
mod manifest;

pub use external::{resolve_command, ExternalCommand};
pub use manifest::{is_valid_name, ManifestProvider, PluginManifest, MANIFEST_EXTENSION};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

use volctl_core::{Handler, HandlerEntry, HandlerSource, LoadError, LoadFailure, Provider};

/// Result of a discovery pass
#[derive(Debug, Default)]
pub struct Discovery {
    /// Loaded handlers, sorted by name
    pub entries: Vec<HandlerEntry>,
    /// Providers that failed to load
    pub failures: Vec<LoadFailure>,
}

impl Discovery {
    /// Names of the loaded handlers
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(HandlerEntry::name).collect()
    }

    pub fn into_entries(self) -> Vec<HandlerEntry> {
        self.entries
    }

    fn record_failure(&mut self, provider: impl Into<String>, err: &LoadError) {
        let provider = provider.into();
        error!("Error initializing plugin {}: {}", provider, err);
        self.failures.push(LoadFailure {
            provider,
            error: err.to_string(),
        });
    }
}

/// Compiled-in provider backed by a constructor function
pub struct StaticProvider {
    name: String,
    category: String,
    constructor: Box<dyn Fn() -> Result<Arc<dyn Handler>, LoadError> + Send + Sync>,
}

impl StaticProvider {
    pub fn new<F>(name: impl Into<String>, category: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Handler>, LoadError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            category: category.into(),
            constructor: Box::new(constructor),
        }
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn load(&self) -> Result<Arc<dyn Handler>, LoadError> {
        (self.constructor)()
    }
}

/// Registry of providers awaiting discovery
#[derive(Default)]
pub struct ExtensionRegistry {
    providers: Vec<Box<dyn Provider>>,
    plugin_dirs: Vec<PathBuf>,
}

impl ExtensionRegistry {
    /// Create a registry scanning the given manifest directories
    pub fn new(plugin_dirs: Vec<PathBuf>) -> Self {
        Self {
            providers: Vec::new(),
            plugin_dirs,
        }
    }

    /// Add a compiled-in provider
    pub fn with_provider(mut self, provider: Box<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Add several compiled-in providers
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Box<dyn Provider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn plugin_dirs(&self) -> &[PathBuf] {
        &self.plugin_dirs
    }

    /// Load every provider registered under `category`
    pub fn discover(&self, category: &str) -> Discovery {
        let mut discovery = Discovery::default();

        for provider in self.providers.iter().filter(|p| p.category() == category) {
            Self::materialize(provider.as_ref(), HandlerSource::Compiled, &mut discovery);
        }

        for dir in &self.plugin_dirs {
            self.discover_in_dir(dir, category, &mut discovery);
        }

        discovery.entries.sort_by(|a, b| a.name().cmp(b.name()));
        info!(
            "Discovered {} plugin(s) in category '{}' ({} failed)",
            discovery.entries.len(),
            category,
            discovery.failures.len()
        );
        discovery
    }

    fn discover_in_dir(&self, dir: &Path, category: &str, discovery: &mut Discovery) {
        if !dir.is_dir() {
            debug!("Plugin directory does not exist: {}", dir.display());
            return;
        }
        debug!("Searching for plugins in: {}", dir.display());

        let mut manifests = match manifest_files(dir) {
            Ok(paths) => paths,
            Err(e) => {
                discovery.record_failure(dir.display().to_string(), &e);
                return;
            }
        };
        manifests.sort();

        for path in manifests {
            let manifest = match PluginManifest::load(&path) {
                Ok(manifest) => manifest,
                Err(e) => {
                    discovery.record_failure(path.display().to_string(), &e);
                    continue;
                }
            };

            if manifest.category != category {
                debug!(
                    "Skipping {} (category '{}')",
                    path.display(),
                    manifest.category
                );
                continue;
            }

            let provider = ManifestProvider::new(manifest, &path);
            Self::materialize(&provider, HandlerSource::Manifest(path.clone()), discovery);
        }
    }

    fn materialize(provider: &dyn Provider, source: HandlerSource, discovery: &mut Discovery) {
        debug!("loading {}", provider.name());

        if !is_valid_name(provider.name()) {
            let err = LoadError::InvalidName(provider.name().to_string());
            discovery.record_failure(format!("{} ({})", provider.name(), source), &err);
            return;
        }

        let loaded = panic::catch_unwind(AssertUnwindSafe(|| provider.load()))
            .unwrap_or_else(|payload| Err(LoadError::Provider(panic_message(payload.as_ref()))));

        match loaded {
            Ok(handler) => {
                discovery
                    .entries
                    .push(HandlerEntry::new(provider.name(), handler, source));
            }
            Err(e) => {
                discovery.record_failure(format!("{} ({})", provider.name(), source), &e);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("panicked while loading: {}", detail)
}

fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
            paths.push(path);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use volctl_core::{DispatchContext, ExitStatus};

    const CATEGORY: &str = "volctl_handlers";

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn invoke(
            &self,
            _ctx: &DispatchContext,
            _args: &[String],
        ) -> volctl_core::Result<ExitStatus> {
            Ok(ExitStatus::SUCCESS)
        }
    }

    fn ok_provider(name: &str) -> Box<dyn Provider> {
        Box::new(StaticProvider::new(name, CATEGORY, || {
            Ok(Arc::new(Noop) as Arc<dyn Handler>)
        }))
    }

    fn broken_provider(name: &str) -> Box<dyn Provider> {
        Box::new(StaticProvider::new(name, CATEGORY, || {
            Err(LoadError::Provider("missing shared library".to_string()))
        }))
    }

    #[test]
    fn test_empty_registry() {
        let discovery = ExtensionRegistry::default().discover(CATEGORY);
        assert!(discovery.entries.is_empty());
        assert!(discovery.failures.is_empty());
    }

    #[test]
    fn test_broken_provider_is_isolated() {
        let registry = ExtensionRegistry::default()
            .with_provider(ok_provider("zap"))
            .with_provider(broken_provider("lvm"))
            .with_provider(ok_provider("raw"));

        let discovery = registry.discover(CATEGORY);

        assert_eq!(discovery.names(), vec!["raw", "zap"]);
        assert_eq!(discovery.failures.len(), 1);
        assert!(discovery.failures[0].provider.starts_with("lvm"));
        assert!(discovery.failures[0].error.contains("missing shared library"));
    }

    #[test]
    fn test_panicking_provider_is_isolated() {
        let panicking: Box<dyn Provider> = Box::new(StaticProvider::new(
            "zfs",
            CATEGORY,
            || -> Result<Arc<dyn Handler>, LoadError> { panic!("pool metadata corrupted") },
        ));
        let registry = ExtensionRegistry::default()
            .with_providers(vec![ok_provider("raw"), panicking, ok_provider("zap")]);

        let discovery = registry.discover(CATEGORY);

        assert_eq!(discovery.names(), vec!["raw", "zap"]);
        assert_eq!(discovery.failures.len(), 1);
        assert!(discovery.failures[0].provider.starts_with("zfs"));
        assert!(discovery.failures[0].error.contains("pool metadata corrupted"));
    }

    #[test]
    fn test_other_categories_ignored() {
        let other: Box<dyn Provider> = Box::new(StaticProvider::new("foreign", "other", || {
            Ok(Arc::new(Noop) as Arc<dyn Handler>)
        }));
        let registry = ExtensionRegistry::default()
            .with_providers(vec![other, ok_provider("raw")]);

        let discovery = registry.discover(CATEGORY);
        assert_eq!(discovery.names(), vec!["raw"]);
    }

    #[test]
    fn test_invalid_provider_name_rejected() {
        let registry = ExtensionRegistry::default().with_provider(ok_provider("two words"));
        let discovery = registry.discover(CATEGORY);
        assert!(discovery.entries.is_empty());
        assert_eq!(discovery.failures.len(), 1);
    }

    #[test]
    fn test_missing_plugin_dir_is_skipped() {
        let registry = ExtensionRegistry::new(vec![PathBuf::from("/nonexistent/plugins.d")]);
        let discovery = registry.discover(CATEGORY);
        assert!(discovery.entries.is_empty());
        assert!(discovery.failures.is_empty());
    }

    #[test]
    fn test_manifest_discovery_with_broken_manifest() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("shell.toml"),
            "name = \"shell\"\ncommand = \"sh\"\nhelp = \"Run a shell\"\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("broken.toml"), "name = [").unwrap();
        std::fs::write(
            temp_dir.path().join("ghost.toml"),
            "name = \"ghost\"\ncommand = \"/nonexistent/volctl-ghost\"\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("foreign.toml"),
            "name = \"foreign\"\ncategory = \"other\"\ncommand = \"sh\"\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "not a manifest").unwrap();

        let registry = ExtensionRegistry::new(vec![temp_dir.path().to_path_buf()]);
        let discovery = registry.discover(CATEGORY);

        assert_eq!(discovery.names(), vec!["shell"]);
        assert_eq!(discovery.entries[0].help_summary(), "Run a shell");
        assert!(matches!(
            discovery.entries[0].source(),
            HandlerSource::Manifest(_)
        ));

        let failed: Vec<&str> = discovery
            .failures
            .iter()
            .map(|f| f.provider.as_str())
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().any(|p| p.ends_with("broken.toml")));
        assert!(failed.iter().any(|p| p.starts_with("ghost")));
    }

    #[test]
    fn test_entries_sorted_across_sources() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("alpha.toml"),
            "name = \"alpha\"\ncommand = \"sh\"\n",
        )
        .unwrap();

        let registry = ExtensionRegistry::new(vec![temp_dir.path().to_path_buf()])
            .with_provider(ok_provider("zap"))
            .with_provider(ok_provider("beta"));

        let discovery = registry.discover(CATEGORY);
        assert_eq!(discovery.names(), vec!["alpha", "beta", "zap"]);
        assert_eq!(registry.plugin_dirs().len(), 1);
    }
}
