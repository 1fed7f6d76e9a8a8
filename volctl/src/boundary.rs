//! Error and interrupt boundary
//!
//! Converts the two failure kinds that represent known conditions into a
//! clean exit with a one-line diagnostic on stderr:
//! - [`CommandError::Expected`] exits with [`ExitStatus::FAILURE`]
//! - [`CommandError::Interrupted`] (including Ctrl+C) exits with
//!   [`ExitStatus::INTERRUPTED`]
//!
//! [`CommandError::Unexpected`] is handed back untouched so it surfaces with
//! its full cause chain.

use colored::*;
use std::future::Future;
use tracing::{error, warn};

use volctl_core::{CommandError, ExitStatus};

/// Run `work` inside the boundary, treating Ctrl+C as an interruption
pub async fn catches<F>(work: F) -> anyhow::Result<ExitStatus>
where
    F: Future<Output = Result<ExitStatus, CommandError>>,
{
    catches_with(work, interrupt_signal()).await
}

/// Run `work` inside the boundary with a custom interruption source
pub async fn catches_with<F, I>(work: F, interrupt: I) -> anyhow::Result<ExitStatus>
where
    F: Future<Output = Result<ExitStatus, CommandError>>,
    I: Future<Output = ()>,
{
    let result = tokio::select! {
        result = work => result,
        _ = interrupt => Err(CommandError::Interrupted),
    };
    resolve(result)
}

/// Map a finished run onto an exit status, passing unexpected errors through
pub fn resolve(result: Result<ExitStatus, CommandError>) -> anyhow::Result<ExitStatus> {
    match result {
        Ok(status) => Ok(status),
        Err(CommandError::Expected(message)) => {
            error!("{}", message);
            eprintln!("{} {}", "-->".red().bold(), message);
            Ok(ExitStatus::FAILURE)
        }
        Err(CommandError::Interrupted) => {
            warn!("Run interrupted");
            eprintln!("{} Aborted", "-->".red().bold());
            Ok(ExitStatus::INTERRUPTED)
        }
        Err(CommandError::Unexpected(err)) => Err(err),
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupt_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
