/// Tracing setup
///
/// Logs go to a daily-rotated file; debug builds also log to stdout.
/// `RUST_LOG` overrides the default `info` filter.
use std::path::{Path, PathBuf};
use sysinfo::System;

pub const LOG_TARGET_STARTUP: &str = "scoreboard_ocr::startup";

/// `<config dir>/ScoreboardOcr/logs`, or `./logs` when there is no config dir
pub fn default_log_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("ScoreboardOcr").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global subscriber. A second call leaves the first in place.
pub fn initialize_tracing(log_dir: &Path) {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(log_dir, "scoreboard-ocr.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // stderr keeps stdout clean for the result JSON
    #[cfg(debug_assertions)]
    let result = {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .try_init()
    };

    #[cfg(not(debug_assertions))]
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: tracing already initialized: {}", e);
        return;
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

pub fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());
    let architecture = std::env::consts::ARCH;

    tracing::info!(target: LOG_TARGET_STARTUP, "Starting scoreboard-ocr v{} on ({})", version, architecture);
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
    tracing::debug!(
        target: LOG_TARGET_STARTUP,
        "Rayon worker threads: {}",
        rayon::current_num_threads()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_name() {
        assert!(default_log_dir().ends_with("logs"));
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        let dir = std::env::temp_dir().join("scoreboard_ocr_logging_test");
        initialize_tracing(&dir);
        initialize_tracing(&dir);
        log_runtime_environment();
        assert!(dir.exists());
    }
}
