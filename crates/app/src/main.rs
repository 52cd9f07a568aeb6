//! Encrypto - local file obfuscation tool
//!
//! Signs the operator in, keeps a list of their folders, and mirrors files
//! into and out of an `Encrypted` subfolder.

use std::process::ExitCode;

use encrypto_core::{Config, Result};

mod logging;
mod picker;
mod prompt;
mod session;

use picker::TerminalPicker;
use prompt::TerminalPrompt;
use session::{Exit, Session};

fn main() -> ExitCode {
    match run() {
        Ok(exit) => ExitCode::from(exit.code() as u8),
        Err(e) => {
            tracing::error!(error = %e, "Encrypto stopped");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<Exit> {
    let config = Config::load()?;
    config.ensure_dirs()?;
    let fresh = !config.database_path().exists();

    logging::init(&config.log_path())?;
    tracing::info!(data_dir = %config.data_dir.display(), "Starting Encrypto");
    if fresh {
        tracing::info!("Assets initialized");
    }

    let mut session = Session::new(&config, TerminalPrompt::new(), TerminalPicker);
    let exit = session.run()?;
    tracing::info!(?exit, "Encrypto finished");
    Ok(exit)
}
