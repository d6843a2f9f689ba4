//! Tracing subscriber setup
//!
//! Console output goes to stderr. When `logging.file` is configured a second,
//! non-blocking layer writes plain text to that file.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Flushes the file writer on exit; must outlive the subscriber
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Dependencies that are noisy at `info`
const QUIET_TARGETS: [&str; 5] = ["chromiumoxide", "hyper", "reqwest", "html5ever", "selectors"];

/// Build the filter: `RUST_LOG` wins over the configured level
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = level.to_ascii_lowercase();
        for target in QUIET_TARGETS {
            directives.push_str(&format!(",{target}=warn"));
        }
        EnvFilter::new(directives)
    })
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed or the log file cannot be
/// created.
pub fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let filter = build_filter(level);
    let console = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let file_layer = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}
