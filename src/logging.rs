use crate::config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Send tracing output to a log file next to the config; the terminal
/// itself belongs to the TUI. Verbosity is controlled with `REVQ_LOG`
/// (standard env-filter syntax), defaulting to `info`.
pub fn init() -> Result<()> {
    let dir = config::get_config_dir().context("could not resolve log directory")?;
    std::fs::create_dir_all(&dir).context("could not create log directory")?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("revq.log"))
        .context("could not open log file")?;

    let filter = EnvFilter::try_from_env("REVQ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
