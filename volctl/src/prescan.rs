//! Global option pre-scanning
//!
//! Pulls the options every subcommand shares (`--log`, `--log-path`) out
//! of the raw argument vector before dispatch. Global options are kept
//! strictly separate from subcommand options: recognized tokens are
//! removed from what the handler eventually sees, wherever they appear.
//! Scanning stops at `--`; everything after it is passed through verbatim.

use std::collections::HashMap;

/// A global option recognized under one or more aliases
#[derive(Debug, Clone, Copy)]
pub struct GlobalOption {
    /// Key the value is stored under
    pub canonical: &'static str,
    /// Spellings accepted on the command line
    pub aliases: &'static [&'static str],
}

impl GlobalOption {
    fn matches(&self, flag: &str) -> bool {
        self.aliases.contains(&flag)
    }
}

/// Verbosity option; `--logging` is an alias of `--log`
pub const LOG: GlobalOption = GlobalOption {
    canonical: "--log",
    aliases: &["--log", "--logging"],
};

/// Log directory option
pub const LOG_PATH: GlobalOption = GlobalOption {
    canonical: "--log-path",
    aliases: &["--log-path"],
};

/// Every option the dispatcher treats as global
pub const GLOBAL_OPTIONS: &[GlobalOption] = &[LOG, LOG_PATH];

/// Result of scanning an argument vector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    values: HashMap<&'static str, String>,
    remaining: Vec<String>,
    recognized: Vec<GlobalOption>,
}

impl GlobalOptions {
    /// Value for an option, looked up by any of its aliases
    pub fn get(&self, alias: &str) -> Option<&str> {
        let option = self.recognized.iter().find(|o| o.matches(alias))?;
        self.values.get(option.canonical).map(String::as_str)
    }

    /// Value for an option, or `default` when it was not given
    pub fn get_or<'a>(&'a self, alias: &str, default: &'a str) -> &'a str {
        self.get(alias).unwrap_or(default)
    }

    /// Arguments after the program name with global options removed
    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    pub fn into_remaining(self) -> Vec<String> {
        self.remaining
    }
}

impl PartialEq for GlobalOption {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for GlobalOption {}

/// Extract `recognized` options from `argv`
///
/// `argv[0]` is the program name and is not scanned. Both `--flag value`
/// and `--flag=value` are accepted; the last occurrence wins. A flag with
/// no value following it is left in place. Unrecognized tokens are kept
/// in order and never cause an error.
pub fn extract(argv: &[String], recognized: &[GlobalOption]) -> GlobalOptions {
    let mut values = HashMap::new();
    let mut remaining = Vec::with_capacity(argv.len().saturating_sub(1));
    let mut tokens = argv.iter().skip(1).peekable();

    while let Some(token) = tokens.next() {
        if token == "--" {
            remaining.push(token.clone());
            remaining.extend(tokens.by_ref().cloned());
            break;
        }

        let (flag, inline_value) = match token.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (token.as_str(), None),
        };

        let Some(option) = recognized.iter().find(|o| o.matches(flag)) else {
            remaining.push(token.clone());
            continue;
        };

        match inline_value {
            Some(value) => {
                values.insert(option.canonical, value.to_string());
            }
            None => match tokens.next_if(|next| next.as_str() != "--") {
                Some(value) => {
                    values.insert(option.canonical, value.clone());
                }
                None => remaining.push(token.clone()),
            },
        }
    }

    GlobalOptions {
        values,
        remaining,
        recognized: recognized.to_vec(),
    }
}
