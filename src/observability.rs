//! This module provides logging and diagnostics for the n-gram stage.
//!
//! The `log_metric!` macro emits structured key-value lines describing what a
//! batch did (rows in, rows out, rows dropped). It is compiled out of release
//! builds. `enable_verbose_logging` installs an `env_logger` backend for hosts
//! that do not bring their own `log` implementation.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::NGramError;

/// Logs a structured key-value metric string at debug level, only in debug builds.
///
/// # Example
/// ```ignore
/// log_metric!("event"="transform_batch", "rows_in"=&rows, "rows_out"=&kept);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::debug!("NGRAM_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an info-level `env_logger` backend, once per process.
///
/// Lines are formatted as `[LEVEL] message`. With `log_file`, output is appended
/// to that file instead of stderr. Returns `true` only for the call that
/// installed the backend; later calls, and calls made after the host already
/// installed a logger, return `false`.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<bool, NGramError> {
    // Open eagerly so a bad path is an error, not a panic inside `call_once`.
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    let mut installed = false;
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Info);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        match builder.try_init() {
            Ok(()) => installed = true,
            Err(e) => log::debug!("Keeping the existing logger: {}", e),
        }
    });
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(None).unwrap();
        // Whoever ran first, a repeated call never installs a second backend.
        assert!(!enable_verbose_logging(None).unwrap());
        log::info!("logging initialised for n-gram stage tests");
    }

    #[test]
    fn test_unopenable_log_file_is_io_error() {
        let result = enable_verbose_logging(Some("/nonexistent-dir/ngram/stage.log"));
        assert!(matches!(result, Err(NGramError::Io(_))));
    }

    #[test]
    fn test_log_metric_expands() {
        let rows = 3;
        log_metric!("event" = "unit_test", "rows" = &rows);
    }
}
