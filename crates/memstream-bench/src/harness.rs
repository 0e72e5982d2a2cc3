//! Execution and timing harness.
//!
//! Drives a backend through a [`Schedule`], timing every step with the
//! monotonic clock. In Isolated order only the total of a step is measured,
//! and each of its slots receives the mean.

use std::time::Instant;

use memstream_common::{
    BENCHMARKS, BenchId, NUM_BENCHMARKS, Result, RunConfig, START_A, START_B, START_C,
    StreamElement,
};
use memstream_kernels::StreamKernels;
use tracing::{debug, info};

use crate::schedule::{Schedule, ScheduleExecutor, Step};

/// Per-kernel durations in seconds, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timings {
    series: [Vec<f64>; NUM_BENCHMARKS],
}

impl Timings {
    pub fn record(&mut self, id: BenchId, seconds: f64) {
        self.series[id.position()].push(seconds);
    }

    /// Durations of `id`; empty if it never ran.
    pub fn series(&self, id: BenchId) -> &[f64] {
        &self.series[id.position()]
    }

    /// Kernels that ran, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (BenchId, &[f64])> {
        BENCHMARKS
            .iter()
            .map(|b| (b.id, self.series(b.id)))
            .filter(|(_, s)| !s.is_empty())
    }
}

/// Everything a finished run produced besides the arrays themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    pub timings: Timings,
    /// Last Dot result; `None` if Dot was not selected.
    pub sum: Option<T>,
    /// Time spent in the pre-run `init_arrays`.
    pub init_seconds: f64,
}

/// Call the kernel behind `id` once.
fn dispatch<T: StreamElement>(
    stream: &mut dyn StreamKernels<T>,
    id: BenchId,
    sum: &mut Option<T>,
) -> Result<()> {
    match id {
        BenchId::Copy => stream.copy(),
        BenchId::Mul => stream.mul(),
        BenchId::Add => stream.add(),
        BenchId::Triad => stream.triad(),
        BenchId::Nstream => stream.nstream(),
        BenchId::Dot => {
            *sum = Some(stream.dot()?);
            Ok(())
        }
    }
}

struct TimedExecutor<'a, T> {
    stream: &'a mut dyn StreamKernels<T>,
    timings: Timings,
    sum: Option<T>,
}

impl<T: StreamElement> ScheduleExecutor for TimedExecutor<'_, T> {
    type Error = memstream_common::StreamError;

    fn execute(&mut self, step: Step) -> Result<()> {
        let id = step.bench.id;
        let start = Instant::now();
        for _ in 0..step.repeats {
            dispatch(&mut *self.stream, id, &mut self.sum)?;
        }
        let elapsed = start.elapsed().as_secs_f64();

        let slot = elapsed / step.repeats.max(1) as f64;
        for _ in 0..step.repeats {
            self.timings.record(id, slot);
        }
        debug!(kernel = %id, repeats = step.repeats, seconds = elapsed, "step finished");
        Ok(())
    }
}

/// Re-seed the arrays with the start constants, then run the configured
/// schedule on `stream`.
///
/// The configuration is validated first; a run with fewer than two
/// repetitions is rejected before any kernel is called.
pub fn run_all<T: StreamElement>(
    stream: &mut dyn StreamKernels<T>,
    config: &RunConfig,
) -> Result<RunOutcome<T>> {
    config.validate()?;

    let start = Instant::now();
    stream.init_arrays(
        T::from_f64_lossy(START_A),
        T::from_f64_lossy(START_B),
        T::from_f64_lossy(START_C),
    )?;
    let init_seconds = start.elapsed().as_secs_f64();
    debug!(init_seconds, "arrays initialised");

    let schedule = Schedule::from_config(config);
    info!(
        backend = stream.name(),
        selection = %config.selection,
        order = %config.order,
        num_times = config.num_times,
        array_size = config.array_size,
        "running kernels"
    );

    let mut executor = TimedExecutor { stream, timings: Timings::default(), sum: None };
    schedule.drive(&mut executor)?;

    Ok(RunOutcome { timings: executor.timings, sum: executor.sum, init_seconds })
}

#[cfg(test)]
mod tests {
    use super::*;
    use memstream_common::{BenchOrder, Selection};
    use memstream_kernels::cpu::SerialStream;

    fn serial(n: usize) -> SerialStream<f64> {
        SerialStream::new(Selection::All, n, 0, 0.0, 0.0, 0.0).unwrap()
    }

    fn config(selection: Selection, order: BenchOrder, num_times: usize) -> RunConfig {
        RunConfig::builder()
            .selection(selection)
            .order(order)
            .array_size(8)
            .num_times(num_times)
            .build()
            .unwrap()
    }

    #[test]
    fn every_active_kernel_gets_num_times_entries() {
        let mut stream = serial(8);
        let outcome =
            run_all(&mut stream, &config(Selection::All, BenchOrder::Classic, 3)).unwrap();
        let ran: Vec<BenchId> = outcome.timings.iter().map(|(id, _)| id).collect();
        assert_eq!(ran.len(), 6);
        assert!(outcome.timings.iter().all(|(_, s)| s.len() == 3));
        assert!(outcome.sum.is_some());
    }

    #[test]
    fn isolated_slots_are_uniform() {
        let mut stream = serial(8);
        let outcome =
            run_all(&mut stream, &config(Selection::Classic, BenchOrder::Isolated, 4)).unwrap();
        for (_, series) in outcome.timings.iter() {
            assert_eq!(series.len(), 4);
            assert!(series.iter().all(|&t| t == series[0]));
        }
    }

    #[test]
    fn sum_absent_without_dot() {
        let mut stream = serial(8);
        let outcome = run_all(
            &mut stream,
            &config(Selection::Only(BenchId::Copy), BenchOrder::Classic, 2),
        )
        .unwrap();
        assert_eq!(outcome.sum, None);
        assert!(outcome.timings.series(BenchId::Dot).is_empty());
    }

    #[test]
    fn arrays_reseeded_before_running() {
        let mut stream = serial(8);
        run_all(&mut stream, &config(Selection::Only(BenchId::Copy), BenchOrder::Classic, 2))
            .unwrap();
        let view = stream.get_arrays().unwrap();
        assert!(view.c.iter().all(|&x| x == START_A));
        assert!(view.b.iter().all(|&x| x == START_B));
    }
}
