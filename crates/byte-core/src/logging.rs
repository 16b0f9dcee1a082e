//! Tracing bootstrap.
//!
//! `RUST_LOG` wins over the configured level. With `logging.file = true`
//! events go to a daily rolling file under `$BYTE_HOME/logs`, otherwise to
//! stderr. Initialization is idempotent and never panics.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, paths};

const LOG_FILE_PREFIX: &str = "byte.log";

/// Keeps the non-blocking writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber. A second call is a no-op.
pub fn init(config: &LoggingConfig) -> Result<()> {
    init_in(config, &paths::logs_dir())
}

/// Same as [`init`] with an explicit log directory.
pub fn init_in(config: &LoggingConfig, log_dir: &Path) -> Result<()> {
    let filter = build_filter(&config.level)?;

    let installed = if config.file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .try_init()
            .is_ok();
        if installed {
            let _ = FILE_GUARD.set(guard);
        }
        installed
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, file = config.file, "logging initialized");
    }
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level.trim()).with_context(|| format!("Invalid log level '{level}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("byte_core=verbose").is_err());
    }

    #[test]
    fn test_init_twice_is_ok() {
        let config = LoggingConfig::default();
        let dir = tempfile::tempdir().unwrap();
        init_in(&config, dir.path()).unwrap();
        init_in(&config, dir.path()).unwrap();
    }
}
