//! Handlers that run an external executable

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use volctl_core::config::{ENV_LOG, ENV_LOG_PATH};
use volctl_core::{CommandError, DispatchContext, ExitStatus, Handler, LoadError};

/// Runs a program with the caller's arguments appended to its fixed ones
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    summary: String,
}

impl ExternalCommand {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<PathBuf>,
        args: Vec<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            summary: summary.into(),
        }
    }
}

#[async_trait]
impl Handler for ExternalCommand {
    async fn invoke(
        &self,
        ctx: &DispatchContext,
        args: &[String],
    ) -> volctl_core::Result<ExitStatus> {
        debug!(
            "Running '{}': {} {:?} {:?}",
            self.name,
            self.program.display(),
            self.args,
            args
        );

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .env(ENV_LOG, ctx.config.verbosity.as_str())
            .env(ENV_LOG_PATH, &ctx.config.log_path)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                CommandError::expected(format!(
                    "Failed to run {} for '{}': {}",
                    self.program.display(),
                    self.name,
                    e
                ))
            })?;

        match status.code() {
            Some(code) => Ok(ExitStatus::from_code(code)),
            None if killed_by_interrupt(&status) => Err(CommandError::Interrupted),
            None => {
                warn!("'{}' terminated by signal: {}", self.name, status);
                Ok(ExitStatus::FAILURE)
            }
        }
    }

    fn help_summary(&self) -> &str {
        &self.summary
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &std::process::ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(2)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &std::process::ExitStatus) -> bool {
    false
}

/// Resolve a manifest `command` to an executable path
///
/// Values containing a path separator are taken as paths (relative ones
/// against `base_dir`); bare names are searched on `PATH`.
pub fn resolve_command(command: &str, base_dir: &Path) -> Result<PathBuf, LoadError> {
    let candidate = Path::new(command);

    if candidate.components().count() > 1 || candidate.is_absolute() {
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            base_dir.join(candidate)
        };
        return if is_executable(&path) {
            Ok(path)
        } else {
            Err(LoadError::CommandNotFound(path.display().to_string()))
        };
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(command))
        .find(|path| is_executable(path))
        .ok_or_else(|| LoadError::CommandNotFound(command.to_string()))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
