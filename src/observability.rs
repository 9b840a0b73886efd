//! This module provides observability and diagnostics for the codecs.
//!
//! The library never installs a logger itself: every message goes through the
//! `log` facade and reaches whatever sink the host has installed. Hosts that
//! have no sink of their own can call [`enable_verbose_logging`].
//!
//! The `log_metric!` macro emits structured key/value lines describing codec
//! decisions. It only fires in debug builds, and only when `debug` logging is
//! enabled for the `tambak_intcodec::metric` target.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Once;

use log::LevelFilter;

use crate::error::Result;

/// Log target used by `log_metric!`.
pub const METRIC_TARGET: &str = "tambak_intcodec::metric";

/// Logs a structured key-value metric line, only in debug builds.
///
/// # Example
/// ```ignore
/// log_metric!("event" = "pfor_encode", "values" = input.len(), "words" = written);
/// ```
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if cfg!(debug_assertions)
            && log::log_enabled!(target: $crate::observability::METRIC_TARGET, log::Level::Debug)
        {
            // Collect each pair as a JSON string fragment
            let mut parts: Vec<String> = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!(
                target: $crate::observability::METRIC_TARGET,
                "INTCODEC_METRIC: {{ {} }}",
                parts.join(", ")
            );
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` sink at `level`, optionally appending to `log_file`
/// instead of stderr.
///
/// Only the first call installs anything; later calls are no-ops, as is any
/// call made after the host installed its own logger.
///
/// # Errors
/// `CodecError::Io` if `log_file` cannot be opened in append mode.
pub fn enable_verbose_logging(log_file: Option<PathBuf>, level: LevelFilter) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(None, LevelFilter::Debug).unwrap();
        enable_verbose_logging(None, LevelFilter::Trace).unwrap();
        log_metric!("event" = "test", "n" = 3);
    }

    #[test]
    fn test_unopenable_log_file_is_io_error() {
        let dir = std::env::temp_dir();
        let result = enable_verbose_logging(Some(dir), LevelFilter::Info);
        assert!(matches!(result, Err(crate::error::CodecError::Io(_))));
    }
}
