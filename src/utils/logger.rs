use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::Local;
use tracing::info;
use tracing_subscriber::{FmtSubscriber, EnvFilter};

/// Installs the global tracing subscriber, writing to a timestamped file in
/// `log_dir`. The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init_logger(log_dir: &Path) -> Result<PathBuf> {
    // Create log directory if it doesn't exist
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_file = log_dir.join(format!("url_taxonomy_{}.log", timestamp));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(fs::File::create(&log_file)?)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Logger initialized, writing to {}", log_file.display());

    Ok(log_file)
}
