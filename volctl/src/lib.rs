//! volctl Library
//!
//! A pluggable command-line dispatcher. The first positional argument is
//! resolved against built-in subcommands and handlers discovered at
//! startup; the match receives the remaining arguments.
//!
//! ```no_run
//! # async fn example() -> anyhow::Result<()> {
//! let argv: Vec<String> = std::env::args().collect();
//! let status = volctl::run(argv, Vec::new()).await?;
//! std::process::exit(status.code().into());
//! # }
//! ```

pub mod boundary;
pub mod builtins;
pub mod dispatcher;
pub mod format;
pub mod help;
pub mod logging;
pub mod prescan;
pub mod registry;
pub mod session;

pub use dispatcher::{Dispatcher, Mapper, Outcome};
pub use registry::{Discovery, ExtensionRegistry, StaticProvider};
pub use session::Session;

use volctl_core::{CommandError, ExitStatus, Provider};

/// Run the dispatcher over `argv` (`argv[0]` is the program name)
///
/// Expected failures and interruptions are reported on stderr and turned
/// into a non-zero status. Any other error is returned.
pub async fn run(
    argv: Vec<String>,
    providers: Vec<Box<dyn Provider>>,
) -> anyhow::Result<ExitStatus> {
    boundary::catches(async move {
        let session = Session::prepare(&argv, providers)?;
        let outcome = session.dispatch().await?;
        Ok::<_, CommandError>(outcome.emit())
    })
    .await
}
