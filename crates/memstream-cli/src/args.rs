//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use memstream_common::{BenchOrder, Selection, Unit};
use memstream_kernels::KernelBackend;

use crate::config::LogFormat;

/// memstream - sustained memory bandwidth on streaming kernels
#[derive(Debug, Clone, Parser)]
#[command(name = "memstream")]
#[command(about = "Measure sustainable memory bandwidth with streaming array kernels")]
#[command(long_about = r#"
Runs the Copy, Mul, Add, Triad, Dot and Nstream kernels over three large arrays,
checks the results against a scalar reference model and reports bandwidth.

Examples:
  # Classic kernels, default size, double precision
  memstream

  # Single kernel, smaller arrays, single precision
  memstream --only Triad --arraysize 1048576 --float

  # Machine-readable output in GiB/s
  memstream --csv --gibibytes
"#)]
#[command(version)]
#[command(group(
    ArgGroup::new("unit")
        .args(["megabytes", "mibibytes", "gigabytes", "gibibytes", "terabytes", "tebibytes"])
        .multiple(false)
))]
pub struct Cli {
    /// List available devices and exit
    #[arg(long)]
    pub list: bool,

    /// Select device at INDEX
    #[arg(long, value_name = "INDEX")]
    pub device: Option<usize>,

    /// Use SIZE elements in each array
    #[arg(short = 's', long = "arraysize", value_name = "SIZE", allow_negative_numbers = true)]
    pub array_size: Option<i64>,

    /// Run the test NUM times (NUM >= 2)
    #[arg(short = 'n', long = "numtimes", value_name = "NUM")]
    pub num_times: Option<usize>,

    /// Use single precision instead of double
    #[arg(long)]
    pub float: bool,

    /// Only run NAME: All, Classic, or one kernel (see --print-names)
    #[arg(short = 'o', long, value_name = "NAME")]
    pub only: Option<Selection>,

    /// Print all available benchmark names and exit
    #[arg(long)]
    pub print_names: bool,

    /// Run order: "Classic" (default) or "Isolated"
    #[arg(long, value_name = "ORDER")]
    pub order: Option<BenchOrder>,

    /// Output results as a CSV table
    #[arg(long)]
    pub csv: bool,

    /// Output results as JSON
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,

    /// Use MB=10^6 for bandwidth (default)
    #[arg(long)]
    pub megabytes: bool,

    /// Use MiB=2^20 for bandwidth
    #[arg(long)]
    pub mibibytes: bool,

    /// Use GB=10^9 for bandwidth
    #[arg(long)]
    pub gigabytes: bool,

    /// Use GiB=2^30 for bandwidth
    #[arg(long)]
    pub gibibytes: bool,

    /// Use TB=10^12 for bandwidth
    #[arg(long)]
    pub terabytes: bool,

    /// Use TiB=2^40 for bandwidth
    #[arg(long)]
    pub tebibytes: bool,

    /// Count validation errors without failing the run
    #[arg(long)]
    pub silence_errors: bool,

    /// Kernel backend (overrides MEMSTREAM_BACKEND)
    #[arg(long, value_name = "NAME")]
    pub backend: Option<KernelBackend>,

    /// Configuration file path
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log format
    #[arg(long, value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Unit picked by one of the unit flags, if any.
    pub fn unit(&self) -> Option<Unit> {
        [
            (self.megabytes, Unit::MegaByte),
            (self.mibibytes, Unit::MibiByte),
            (self.gigabytes, Unit::GigaByte),
            (self.gibibytes, Unit::GibiByte),
            (self.terabytes, Unit::TeraByte),
            (self.tebibytes, Unit::TebiByte),
        ]
        .into_iter()
        .find_map(|(set, unit)| set.then_some(unit))
    }
}
