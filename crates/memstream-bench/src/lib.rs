//! Benchmark engine for memstream
//!
//! Runs the streaming kernels of a backend according to a [`Schedule`],
//! predicts the final array state with a scalar reference model and checks
//! the backend against it.
//!
//! ```no_run
//! use memstream_bench::execute;
//! use memstream_common::{RunConfig, START_A, START_B, START_C};
//! use memstream_kernels::{KernelBackend, make_stream};
//!
//! let config = RunConfig::builder().array_size(1 << 20).num_times(10).build()?;
//! let mut stream = make_stream::<f64>(
//!     KernelBackend::best_available(),
//!     config.selection,
//!     config.array_size,
//!     config.device,
//!     START_A,
//!     START_B,
//!     START_C,
//! )?;
//! let run = execute(stream.as_mut(), &config)?;
//! assert!(run.report.passed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use memstream_common::{Result, RunConfig, StreamElement};
use memstream_kernels::StreamKernels;

pub mod harness;
pub mod reference;
pub mod schedule;
pub mod stats;
pub mod validation;

pub use harness::{RunOutcome, Timings, run_all};
pub use reference::GoldState;
pub use schedule::{Schedule, ScheduleExecutor, Step};
pub use stats::{KernelSummary, summarize};
pub use validation::{Mismatch, ValidationReport, check_solution, relative_check, validate};

/// A finished, validated run.
#[derive(Debug, Clone)]
pub struct CheckedRun<T> {
    pub outcome: RunOutcome<T>,
    pub report: ValidationReport<T>,
    pub summaries: Vec<KernelSummary>,
}

/// Run the configured schedule on `stream`, read the arrays back, validate
/// them and summarise the timings.
pub fn execute<T: StreamElement>(
    stream: &mut dyn StreamKernels<T>,
    config: &RunConfig,
) -> Result<CheckedRun<T>> {
    let outcome = run_all(stream, config)?;
    let report = check_solution(config, stream.get_arrays()?, outcome.sum);
    let summaries = summarize(&outcome.timings, config, T::size_of());
    Ok(CheckedRun { outcome, report, summaries })
}
