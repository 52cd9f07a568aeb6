//! Append-only log file
//!
//! Every `tracing` event goes to `<data_dir>/logs.log` as a plain
//! timestamped line. The terminal stays free for prompts.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use encrypto_core::cache::TIMESTAMP_FORMAT;
use encrypto_core::{Error, Result};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Local wall-clock timestamps, `YYYY-MM-DD HH:MM:SS`
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// Install the global subscriber writing to `path`
///
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_timer(LocalTimestamp),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {e}")))
}
