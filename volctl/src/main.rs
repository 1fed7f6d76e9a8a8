//! volctl CLI
//!
//! Dispatches storage volume subcommands to built-in and plugin handlers.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let argv: Vec<String> = std::env::args().collect();
    let status = volctl::run(argv, Vec::new()).await?;
    Ok(status.into())
}
