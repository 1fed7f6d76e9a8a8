//! Subcommand dispatch
//!
//! Resolution order for the first positional argument:
//! 1. nothing left: help
//! 2. a registered handler name: invoke it
//! 3. a help or version marker: print it
//! 4. anything else: unknown command
//!
//! Handlers are resolved before the markers, so a plugin registered as
//! `help` or `version` takes precedence over the built-in text.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use volctl_core::{DispatchContext, ExitStatus, HandlerEntry, HandlerSource, Result};

/// Tokens that request help
pub const HELP_MARKERS: &[&str] = &["-h", "--help", "help"];

/// Tokens that request the version
pub const VERSION_MARKERS: &[&str] = &["-v", "--version", "version"];

/// Name to handler mapping; the last registration for a name wins
#[derive(Debug, Default, Clone)]
pub struct Mapper {
    entries: BTreeMap<String, HandlerEntry>,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, returning the one it replaced
    pub fn insert(&mut self, entry: HandlerEntry) -> Option<HandlerEntry> {
        let previous = self.entries.insert(entry.name().to_string(), entry);
        if let Some(previous) = &previous {
            warn!(
                "Subcommand '{}' from {} replaced by a later registration",
                previous.name(),
                previous.source()
            );
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&HandlerEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by name
    pub fn entries(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries.values()
    }

    /// Entries shipped with the dispatcher
    pub fn builtins(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries()
            .filter(|e| matches!(e.source(), HandlerSource::Builtin))
    }

    /// Entries contributed by discovery
    pub fn plugins(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries()
            .filter(|e| !matches!(e.source(), HandlerSource::Builtin))
    }
}

impl Extend<HandlerEntry> for Mapper {
    fn extend<T: IntoIterator<Item = HandlerEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<HandlerEntry> for Mapper {
    fn from_iter<T: IntoIterator<Item = HandlerEntry>>(iter: T) -> Self {
        let mut mapper = Mapper::new();
        mapper.extend(iter);
        mapper
    }
}

/// Terminal state of a dispatch pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Help text to print on stdout
    Help(String),
    /// Version string to print on stdout
    Version(String),
    /// A handler ran to completion
    Invoked { name: String, status: ExitStatus },
    /// No handler or marker matched
    Unmatched { token: String, usage: String },
}

impl Outcome {
    /// Exit status for this outcome
    pub fn status(&self) -> ExitStatus {
        match self {
            Outcome::Help(_) | Outcome::Version(_) => ExitStatus::SUCCESS,
            Outcome::Invoked { status, .. } => *status,
            Outcome::Unmatched { .. } => ExitStatus::USAGE,
        }
    }

    /// Print any text the outcome carries and return its exit status
    pub fn emit(self) -> ExitStatus {
        let status = self.status();
        match self {
            Outcome::Help(text) => println!("{}", text),
            Outcome::Version(version) => println!("{}", version),
            Outcome::Invoked { .. } => {}
            Outcome::Unmatched { token, usage } => {
                eprintln!("Unknown command: {}", token);
                eprintln!("{}", usage);
            }
        }
        status
    }
}

/// Resolves and invokes subcommands
#[derive(Debug, Default, Clone)]
pub struct Dispatcher {
    mapper: Mapper,
    usage: String,
}

impl Dispatcher {
    pub fn new(mapper: Mapper, usage: impl Into<String>) -> Self {
        Self {
            mapper,
            usage: usage.into(),
        }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Run one pass of the dispatch state machine over `ctx.argv`
    pub async fn dispatch(&self, ctx: &DispatchContext) -> Result<Outcome> {
        let Some(first) = ctx.argv.first() else {
            return Ok(Outcome::Help(ctx.help.clone()));
        };

        if let Some(entry) = self.mapper.get(first) {
            debug!("Dispatching '{}' ({})", entry.name(), entry.source());
            let status = entry.handler().invoke(ctx, &ctx.argv[1..]).await?;
            debug!("'{}' finished with status {}", entry.name(), status);
            return Ok(Outcome::Invoked {
                name: entry.name().to_string(),
                status,
            });
        }

        if HELP_MARKERS.contains(&first.as_str()) {
            return Ok(Outcome::Help(ctx.help.clone()));
        }

        if VERSION_MARKERS.contains(&first.as_str()) {
            return Ok(Outcome::Version(ctx.version.clone()));
        }

        Ok(Outcome::Unmatched {
            token: first.clone(),
            usage: self.usage.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use volctl_core::{CommandError, Handler};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl Handler for Recorder {
        async fn invoke(&self, _ctx: &DispatchContext, args: &[String]) -> Result<ExitStatus> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(ExitStatus::SUCCESS)
        }
    }

    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn invoke(&self, _ctx: &DispatchContext, _args: &[String]) -> Result<ExitStatus> {
            Err(CommandError::expected("device is busy"))
        }
    }

    fn ctx(argv: &[&str]) -> DispatchContext {
        DispatchContext {
            argv: argv.iter().map(|a| a.to_string()).collect(),
            help: "HELP".to_string(),
            version: "1.2.3".to_string(),
            ..DispatchContext::default()
        }
    }

    fn dispatcher_with(entries: Vec<HandlerEntry>) -> Dispatcher {
        Dispatcher::new(entries.into_iter().collect(), "usage: volctl <subcommand>")
    }

    #[tokio::test]
    async fn test_no_arguments_prints_help() {
        let outcome = dispatcher_with(vec![]).dispatch(&ctx(&[])).await.unwrap();
        assert_eq!(outcome, Outcome::Help("HELP".to_string()));
        assert!(outcome.status().is_success());
    }

    #[tokio::test]
    async fn test_markers() {
        let dispatcher = dispatcher_with(vec![]);
        for marker in HELP_MARKERS {
            let outcome = dispatcher.dispatch(&ctx(&[*marker])).await.unwrap();
            assert_eq!(outcome, Outcome::Help("HELP".to_string()));
        }
        for marker in VERSION_MARKERS {
            let outcome = dispatcher.dispatch(&ctx(&[*marker])).await.unwrap();
            assert_eq!(outcome, Outcome::Version("1.2.3".to_string()));
        }
    }

    #[tokio::test]
    async fn test_invokes_exactly_one_handler() {
        let lvm = Arc::new(Recorder::default());
        let raw = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(vec![
            HandlerEntry::new("lvm", lvm.clone(), HandlerSource::Compiled),
            HandlerEntry::new("raw", raw.clone(), HandlerSource::Compiled),
        ]);

        let outcome = dispatcher
            .dispatch(&ctx(&["lvm", "prepare", "--data", "/dev/sdb"]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Invoked {
                name: "lvm".to_string(),
                status: ExitStatus::SUCCESS
            }
        );
        assert_eq!(
            *lvm.calls.lock().unwrap(),
            vec![vec!["prepare".to_string(), "--data".to_string(), "/dev/sdb".to_string()]]
        );
        assert!(raw.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handler_shadows_help_marker() {
        let help = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(vec![HandlerEntry::new(
            "help",
            help.clone(),
            HandlerSource::Compiled,
        )]);

        let outcome = dispatcher.dispatch(&ctx(&["help"])).await.unwrap();
        assert!(matches!(outcome, Outcome::Invoked { .. }));
        assert_eq!(help.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_command() {
        let lvm = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(vec![HandlerEntry::new(
            "lvm",
            lvm.clone(),
            HandlerSource::Compiled,
        )]);

        let outcome = dispatcher.dispatch(&ctx(&["unknown-cmd"])).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Unmatched {
                token: "unknown-cmd".to_string(),
                usage: "usage: volctl <subcommand>".to_string()
            }
        );
        assert_eq!(outcome.status(), ExitStatus::USAGE);
        assert!(lvm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let lvm = Arc::new(Recorder::default());
        let dispatcher = dispatcher_with(vec![HandlerEntry::new(
            "lvm",
            lvm.clone(),
            HandlerSource::Compiled,
        )]);

        let outcome = dispatcher.dispatch(&ctx(&["LVM"])).await.unwrap();
        assert!(matches!(outcome, Outcome::Unmatched { .. }));
    }

    #[tokio::test]
    async fn test_handler_errors_propagate() {
        let dispatcher = dispatcher_with(vec![HandlerEntry::new(
            "zap",
            Arc::new(Failing),
            HandlerSource::Compiled,
        )]);

        let err = dispatcher.dispatch(&ctx(&["zap"])).await.unwrap_err();
        assert!(matches!(err, CommandError::Expected(_)));
    }

    #[test]
    fn test_mapper_last_registration_wins() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());

        let mut mapper = Mapper::new();
        assert!(mapper
            .insert(HandlerEntry::new("lvm", first, HandlerSource::Builtin))
            .is_none());
        let replaced = mapper.insert(HandlerEntry::new(
            "lvm",
            second,
            HandlerSource::Compiled,
        ));

        assert_eq!(replaced.map(|e| e.source().clone()), Some(HandlerSource::Builtin));
        assert_eq!(mapper.len(), 1);
        assert_eq!(mapper.get("lvm").unwrap().source(), &HandlerSource::Compiled);
        assert_eq!(mapper.builtins().count(), 0);
        assert_eq!(mapper.plugins().count(), 1);
    }
}
