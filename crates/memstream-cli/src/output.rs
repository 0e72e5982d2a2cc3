//! Result rendering: text table, CSV and JSON.

use std::io::{self, Write};

use memstream_bench::{KernelSummary, ValidationReport};
use memstream_common::{BENCHMARKS, BenchOrder, RunConfig, Selection, StreamElement, Unit};
use serde::Serialize;

const CSV_SEPARATOR: &str = ",";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_flags(csv: bool, json: bool) -> Self {
        match (csv, json) {
            (true, _) => OutputFormat::Csv,
            (false, true) => OutputFormat::Json,
            (false, false) => OutputFormat::Table,
        }
    }

    /// Table output carries the banner and run header.
    pub fn is_text(self) -> bool {
        self == OutputFormat::Table
    }
}

pub fn write_names(w: &mut impl Write) -> io::Result<()> {
    let labels: Vec<&str> = BENCHMARKS.iter().map(|b| b.label).collect();
    writeln!(w, "Available benchmarks: {}", labels.join(","))
}

pub fn write_devices(w: &mut impl Write, lines: &[String]) -> io::Result<()> {
    if lines.is_empty() {
        return writeln!(w, "No devices found.");
    }
    for line in lines {
        writeln!(w, "{line}")?;
    }
    Ok(())
}

pub fn write_banner(w: &mut impl Write, implementation: &str) -> io::Result<()> {
    writeln!(w, "memstream")?;
    writeln!(w, "Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "Implementation: {implementation}")
}

fn running_line(selection: Selection, num_times: usize, order: BenchOrder) -> String {
    let what = match selection {
        Selection::All | Selection::Classic => format!("{selection} kernels"),
        Selection::Only(id) => format!("{id} kernel"),
    };
    format!("Running {what} {num_times} times in {order} order")
}

pub fn write_header<T: StreamElement>(
    w: &mut impl Write,
    config: &RunConfig,
    unit: Unit,
) -> io::Result<()> {
    writeln!(w, "{}", running_line(config.selection, config.num_times, config.order))?;
    writeln!(w, "Number of elements: {}", config.array_size)?;
    writeln!(w, "Precision: {}", T::type_name())?;
    // Float arithmetic: sizes near usize::MAX are reported, not overflowed.
    let nbytes = config.array_size as f64 * T::size_of() as f64;
    writeln!(w, "Array size: {:.1} {unit}", unit.scale(nbytes))?;
    writeln!(w, "Total size: {:.1} {unit}", unit.scale(3.0 * nbytes))
}

pub fn write_table(w: &mut impl Write, summaries: &[KernelSummary], unit: Unit) -> io::Result<()> {
    writeln!(
        w,
        "{:<12}{:<12}{:<12}{:<12}{:<12}",
        "Function",
        format!("{unit}/s"),
        "Min (sec)",
        "Max",
        "Average"
    )?;
    for s in summaries {
        writeln!(
            w,
            "{:<12}{:<12.3}{:<12.5}{:<12.5}{:<12.5}",
            s.label,
            s.bandwidth(unit),
            s.min,
            s.max,
            s.avg
        )?;
    }
    Ok(())
}

pub fn write_csv(
    w: &mut impl Write,
    summaries: &[KernelSummary],
    config: &RunConfig,
    elem_size: usize,
    unit: Unit,
) -> io::Result<()> {
    let header = [
        "function".to_string(),
        "num_times".to_string(),
        "n_elements".to_string(),
        "sizeof".to_string(),
        format!("max_{unit}_per_sec"),
        "min_runtime".to_string(),
        "max_runtime".to_string(),
        "avg_runtime".to_string(),
    ];
    writeln!(w, "{}", header.join(CSV_SEPARATOR))?;
    for s in summaries {
        let row = [
            s.label.to_string(),
            config.num_times.to_string(),
            config.array_size.to_string(),
            elem_size.to_string(),
            s.bandwidth(unit).to_string(),
            s.min.to_string(),
            s.max.to_string(),
            s.avg.to_string(),
        ];
        writeln!(w, "{}", row.join(CSV_SEPARATOR))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct JsonRow {
    pub function: &'static str,
    pub bandwidth: f64,
    pub min_runtime: f64,
    pub max_runtime: f64,
    pub avg_runtime: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonValidation {
    pub passed: bool,
    pub failures: usize,
}

/// Full machine-readable report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub implementation: &'a str,
    pub config: &'a RunConfig,
    pub sizeof: usize,
    pub unit: String,
    pub init_seconds: f64,
    pub results: Vec<JsonRow>,
    pub validation: JsonValidation,
}

impl<'a> JsonReport<'a> {
    pub fn new<T: StreamElement>(
        implementation: &'a str,
        config: &'a RunConfig,
        summaries: &[KernelSummary],
        report: &ValidationReport<T>,
        init_seconds: f64,
        unit: Unit,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            implementation,
            config,
            sizeof: T::size_of(),
            unit: unit.to_string(),
            init_seconds,
            results: summaries
                .iter()
                .map(|s| JsonRow {
                    function: s.label,
                    bandwidth: s.bandwidth(unit),
                    min_runtime: s.min,
                    max_runtime: s.max,
                    avg_runtime: s.avg,
                })
                .collect(),
            validation: JsonValidation { passed: report.passed(), failures: report.failures },
        }
    }
}

pub fn write_json(w: &mut impl Write, report: &JsonReport<'_>) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, report)?;
    writeln!(w)
}
