//! Logging setup
//!
//! Events go to `<log_path>/volctl.log`. When the file cannot be opened
//! (missing permissions on the default `/var/log/volctl`, read-only media)
//! they go to stderr instead. `RUST_LOG` overrides the configured level.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use volctl_core::{LogLevel, VolumeConfig};

/// Where log events end up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// Filter for the configured verbosity, unless `RUST_LOG` is set
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.filter_directive()))
}

/// Create the log directory if needed and open the log file for appending
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Note the stderr fallback; only visible at debug verbosity
fn report_fallback(log_file: &Path, err: &std::io::Error) {
    tracing::debug!(
        "Cannot open log file {}: {}; logging to stderr",
        log_file.display(),
        err
    );
}

/// Initialize the global subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn setup(config: &VolumeConfig) -> LogTarget {
    let filter = build_filter(config.verbosity);
    let log_file = config.log_file();

    match open_log_file(&log_file) {
        Ok(file) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init();
            LogTarget::File(log_file)
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
            report_fallback(&log_file, &e);
            LogTarget::Stderr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn fallback_output(level: LogLevel) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(level.filter_directive()))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || writer.clone()),
            );

        tracing::subscriber::with_default(subscriber, || {
            report_fallback(
                Path::new("/var/log/volctl/volctl.log"),
                &io::Error::from(io::ErrorKind::PermissionDenied),
            );
        });

        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_fallback_notice_hidden_at_default_level() {
        assert!(fallback_output(LogLevel::Info).is_empty());
        assert!(fallback_output(LogLevel::Warning).is_empty());
    }

    #[test]
    fn test_fallback_notice_shown_at_debug() {
        let output = fallback_output(LogLevel::Debug);
        assert!(output.contains("Cannot open log file /var/log/volctl/volctl.log"));
    }

    #[test]
    fn test_open_log_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("logs").join("volctl.log");

        let file = open_log_file(&path).unwrap();
        drop(file);
        assert!(path.exists());

        // Second open appends rather than failing
        assert!(open_log_file(&path).is_ok());
    }

    #[test]
    fn test_open_log_file_under_a_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        assert!(open_log_file(&blocker.join("volctl.log")).is_err());
    }

    #[test]
    fn test_setup_reports_target() {
        let temp_dir = TempDir::new().unwrap();
        let config = VolumeConfig {
            log_path: temp_dir.path().to_path_buf(),
            ..VolumeConfig::default()
        };

        assert_eq!(setup(&config), LogTarget::File(config.log_file()));
        assert!(config.log_file().exists());
    }
}
