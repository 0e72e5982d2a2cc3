//! Aggregate statistics over a run's timings.

use memstream_common::{RunConfig, Unit};
use serde::Serialize;

use crate::harness::Timings;

/// Summary of one kernel's timings, cold start excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelSummary {
    pub label: &'static str,
    pub weight: usize,
    /// Seconds.
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Best-case bandwidth, taken from `min`.
    pub bandwidth_bytes_per_sec: f64,
}

impl KernelSummary {
    pub fn bandwidth(&self, unit: Unit) -> f64 {
        unit.scale(self.bandwidth_bytes_per_sec)
    }
}

/// Summarise every active kernel in registry order.
///
/// The first duration of each series is dropped. Kernels with fewer than
/// two recorded durations are skipped.
pub fn summarize(timings: &Timings, config: &RunConfig, elem_size: usize) -> Vec<KernelSummary> {
    config
        .selection
        .active()
        .filter_map(|bench| {
            let warm = timings.series(bench.id).get(1..).filter(|s| !s.is_empty())?;
            let min = warm.iter().copied().fold(f64::INFINITY, f64::min);
            let max = warm.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = warm.iter().sum::<f64>() / warm.len() as f64;
            let bytes = bench.weight as f64 * elem_size as f64 * config.array_size as f64;
            Some(KernelSummary {
                label: bench.label,
                weight: bench.weight,
                min,
                max,
                avg,
                bandwidth_bytes_per_sec: bytes / min,
            })
        })
        .collect()
}
