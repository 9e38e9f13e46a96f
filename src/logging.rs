//! Logging initialization
//!
//! The terminal belongs to the UI, so log output goes to a file when one is
//! given and is discarded otherwise. `CYBER_ACADEMY_LOG` overrides the
//! verbosity-derived filter.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "CYBER_ACADEMY_LOG";

/// Map `-v` count to a filter directive
///
/// - 0 → `warn`
/// - 1 → `info`
/// - 2 → `debug`
/// - 3+ → `trace`
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(verbosity >= 2)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(9), "trace");
    }

    #[test]
    fn init_logging_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("academy.log");
        init_logging(1, Some(&path)).unwrap();
        init_logging(0, None).unwrap();
        assert!(path.exists());
    }
}
