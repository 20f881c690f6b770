//! Application entry point.
//!
//! With a subcommand the tool runs in CLI mode and exits; without one it
//! launches the desktop application:
//!
//! ```bash
//! traceconv convert raw.csv --columns 0;2 --user jane
//! traceconv verify-hash traces/converted/raw_sf.json
//! traceconv
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser as _;
use traceconv::{cli, gui, logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init()?;

    let cli = cli::Cli::parse();

    if let Some(command) = cli.command {
        cli::run_command(command)?;
        return Ok(());
    }

    // No subcommand: launch the desktop application
    gui::run()?;
    Ok(())
}
