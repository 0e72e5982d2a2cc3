//! memstream command-line application
//!
//! Measures sustainable memory bandwidth with the streaming kernels and
//! validates every run against the scalar reference model.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use memstream_cli::app;
use memstream_cli::args::Cli;
use memstream_cli::config::{CliConfig, ConfigBuilder};
use memstream_cli::exit::{EXIT_GENERIC_FAIL, parse_exit_code};
use memstream_cli::logging::setup_logging;
use tracing::error;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_exit_code(&e);
            // Help and version text go to stdout, usage errors to stderr.
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let code = match real_main(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("{} {e:#}", style("error:").red().bold());
            EXIT_GENERIC_FAIL
        }
    };
    std::process::exit(code);
}

fn real_main(cli: &Cli) -> Result<i32> {
    let config = load_configuration(cli)?;
    setup_logging(&config.logging)?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    app::run(cli, &config, &mut stdout.lock(), &mut stderr.lock())
}

/// Load the config file named by `--config`, then apply logging flags.
fn load_configuration(cli: &Cli) -> Result<CliConfig> {
    let builder = match &cli.config {
        Some(path) => ConfigBuilder::from_file(path)?,
        None => ConfigBuilder::new(),
    };
    builder
        .log_level(cli.log_level.clone())
        .log_format(cli.log_format)
        .build()
        .context("Failed to build configuration")
}
