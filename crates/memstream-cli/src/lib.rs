//! memstream CLI library
//!
//! The binary is a thin wrapper; argument types, configuration and the run
//! driver live here so tests can exercise them without spawning a process.

use clap::CommandFactory;

pub mod app;
pub mod args;
pub mod config;
pub mod exit;
pub mod logging;
pub mod output;

pub use args::Cli;

/// The clap command behind the `memstream` binary.
pub fn build_cli() -> clap::Command {
    Cli::command()
}
