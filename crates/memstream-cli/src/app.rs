//! Run driver: resolves settings, runs the benchmark and writes results.

use std::io::Write;

use anyhow::{Context, Result};
use console::style;
use memstream_bench::execute;
use memstream_common::{
    BenchOrder, Precision, RunConfig, START_A, START_B, START_C, Selection, StreamElement, Unit,
};
use memstream_kernels::{
    KernelBackend, StreamKernels, device_driver, device_name, list_devices, make_stream,
};
use tracing::{info, warn};

use crate::args::Cli;
use crate::config::CliConfig;
use crate::exit::{EXIT_SUCCESS, EXIT_VALIDATION_FAIL};
use crate::output::{self, JsonReport, OutputFormat};

/// Everything needed for one run, after flags and config file are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub run: RunConfig,
    pub backend: KernelBackend,
    pub unit: Unit,
    pub format: OutputFormat,
}

/// Backend from the flag, then `MEMSTREAM_BACKEND`, then the config file,
/// then the best compiled one.
pub fn resolve_backend(cli: &Cli, config: &CliConfig) -> Result<KernelBackend> {
    KernelBackend::resolve(cli.backend, config.defaults.backend.as_deref())
        .context("Failed to resolve kernel backend")
}

/// Merge flags over config-file defaults and validate the result.
pub fn resolve_settings(cli: &Cli, config: &CliConfig) -> Result<Settings> {
    let defaults = &config.defaults;

    let selection = match (cli.only, defaults.only.as_deref()) {
        (Some(selection), _) => selection,
        (None, Some(name)) => {
            name.parse::<Selection>().context("Invalid benchmark name in config file")?
        }
        (None, None) => Selection::default(),
    };
    let order = match (cli.order, defaults.order.as_deref()) {
        (Some(order), _) => order,
        (None, Some(name)) => name.parse::<BenchOrder>().context("Invalid order in config file")?,
        (None, None) => BenchOrder::default(),
    };
    let unit = match (cli.unit(), defaults.unit.as_deref()) {
        (Some(unit), _) => unit,
        (None, Some(name)) => name.parse::<Unit>().context("Invalid unit in config file")?,
        (None, None) => Unit::default(),
    };
    let precision = if cli.float {
        Precision::Single
    } else {
        defaults.precision.unwrap_or_default()
    };

    let mut builder = RunConfig::builder()
        .selection(selection)
        .order(order)
        .precision(precision)
        .silence_errors(cli.silence_errors || defaults.silence_errors.unwrap_or(false));
    if let Some(size) = cli.array_size.or(defaults.array_size) {
        builder = builder.array_size(size);
    }
    if let Some(n) = cli.num_times.or(defaults.num_times) {
        builder = builder.num_times(n);
    }
    if let Some(device) = cli.device.or(defaults.device) {
        builder = builder.device(device);
    }
    let run = builder.build().context("Invalid run configuration")?;

    Ok(Settings {
        run,
        backend: resolve_backend(cli, config)?,
        unit,
        format: OutputFormat::from_flags(cli.csv, cli.json),
    })
}

/// Execute the command line. Returns the process exit code.
pub fn run(
    cli: &Cli,
    config: &CliConfig,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    if cli.print_names {
        output::write_names(out)?;
        return Ok(EXIT_SUCCESS);
    }
    if cli.list {
        let backend = resolve_backend(cli, config)?;
        output::write_devices(out, &list_devices(backend))?;
        return Ok(EXIT_SUCCESS);
    }

    let settings = resolve_settings(cli, config)?;
    if settings.format.is_text() {
        output::write_banner(out, &settings.backend.to_string())?;
    }
    match settings.run.precision {
        Precision::Single => run_typed::<f32>(&settings, out, err),
        Precision::Double => run_typed::<f64>(&settings, out, err),
    }
}

fn run_typed<T: StreamElement>(
    settings: &Settings,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let Settings { run: config, backend, unit, format } = settings;

    if format.is_text() {
        output::write_header::<T>(out, config, *unit)?;
    }

    let mut stream = make_stream::<T>(
        *backend,
        config.selection,
        config.array_size,
        config.device,
        T::from_f64_lossy(START_A),
        T::from_f64_lossy(START_B),
        T::from_f64_lossy(START_C),
    )
    .with_context(|| format!("Failed to create {backend} backend"))?;
    let device = device_name(*backend, config.device)?;
    let driver = device_driver(*backend, config.device)?;
    info!(%device, %driver, "using device");

    run_stream(stream.as_mut(), settings, out, err)
}

/// Benchmark an already constructed backend and write the results.
///
/// Validation diagnostics go to `err`. Returns [`EXIT_VALIDATION_FAIL`] when
/// validation fails and errors are not silenced; no results are written then.
pub fn run_stream<T: StreamElement>(
    stream: &mut dyn StreamKernels<T>,
    settings: &Settings,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let Settings { run: config, backend, unit, format } = settings;
    let checked = execute(stream, config).context("Benchmark run failed")?;

    for mismatch in &checked.report.diagnostics {
        writeln!(err, "{mismatch}")?;
    }
    if checked.report.should_fail(config.silence_errors) {
        writeln!(
            err,
            "{} {} validation failure(s)",
            style("error:").red().bold(),
            checked.report.failures
        )?;
        return Ok(EXIT_VALIDATION_FAIL);
    }
    if !checked.report.passed() {
        warn!(failures = checked.report.failures, "validation errors silenced");
    }

    match format {
        OutputFormat::Table => output::write_table(out, &checked.summaries, *unit)?,
        OutputFormat::Csv => {
            output::write_csv(out, &checked.summaries, config, T::size_of(), *unit)?
        }
        OutputFormat::Json => {
            let implementation = backend.to_string();
            let report = JsonReport::new(
                &implementation,
                config,
                &checked.summaries,
                &checked.report,
                checked.outcome.init_seconds,
                *unit,
            );
            output::write_json(out, &report)?
        }
    }
    Ok(EXIT_SUCCESS)
}
