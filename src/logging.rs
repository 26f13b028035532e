use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROEVAL_LOG";
const LOG_FILE: &str = "proeval.log";

/// Route `tracing` output to a file in the data directory; the terminal is
/// owned by the UI while the app runs.
///
/// `PROEVAL_LOG` overrides `default_level` using the usual `EnvFilter` syntax.
pub fn init(data_dir: &Path, default_level: &str) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialised: {e}"))?;
    Ok(())
}
