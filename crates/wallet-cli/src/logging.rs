//! File-based logging setup
//!
//! Logs go to a file rather than the terminal so command output stays
//! clean. Level is controlled through the standard env filter.

use std::fs::File;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use wallet_core::Config;

/// Initialize logging to the configured log file.
///
/// Failures here are reported but never fatal.
pub fn init(config: &Config) {
    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("wallet.log"));

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wallet_core=info,wallet_cli=info"));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .try_init();

    info!("logging initialized to {:?}", log_path);
}
