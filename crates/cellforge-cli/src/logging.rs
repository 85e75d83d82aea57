//! Console and file logging for the CLI, built on `tracing`.

use crate::error::Result;
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Installs the global subscriber: a compact stderr layer, plus a plain
/// (no-ANSI) file layer when `log_file` is given. `quiet` wins over any
/// verbosity.
pub fn init(verbosity: u8, quiet: bool, log_file: &Option<PathBuf>) -> Result<()> {
    let level = match (quiet, verbosity) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let registry = tracing_subscriber::registry().with(level).with(console);

    match log_file {
        Some(path) => {
            let file_layer = fmt::layer()
                .with_writer(File::create(path)?)
                .with_ansi(false);
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
    Ok(())
}
