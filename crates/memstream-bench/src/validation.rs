//! Cross-validation of backend output against the reference model.
//!
//! Each element is compared with a relative bound: a value passes when
//! `|is - should| <= max(|is|, |should|) * max_rel`. NaN never passes. The dot
//! result gets a much looser bound than array elements because a reduction
//! accumulates rounding error.

use std::fmt;

use memstream_common::{RunConfig, StreamElement};
use memstream_kernels::ArrayView;
use tracing::{debug, warn};

use crate::reference::GoldState;
use crate::schedule::Schedule;

/// Mismatches kept with full detail; later ones are only counted.
pub const MAX_DIAGNOSTICS: usize = 10;

/// Array tolerance in units of machine epsilon.
pub const ARRAY_TOLERANCE_EPS: f64 = 100.0;
/// Dot-product tolerance in units of machine epsilon.
pub const DOT_TOLERANCE_EPS: f64 = 10_000_000.0;

pub fn array_tolerance<T: StreamElement>() -> T {
    T::epsilon() * T::from_f64_lossy(ARRAY_TOLERANCE_EPS)
}

pub fn dot_tolerance<T: StreamElement>() -> T {
    T::epsilon() * T::from_f64_lossy(DOT_TOLERANCE_EPS)
}

/// Outcome of one relative comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeCheck<T> {
    pub diff: T,
    pub largest: T,
    pub threshold: T,
    pub passed: bool,
}

pub fn relative_check<T: StreamElement>(is: T, should: T, max_rel: T) -> RelativeCheck<T> {
    let diff = (is - should).abs();
    let largest = is.abs().max(should.abs());
    let threshold = largest * max_rel;
    RelativeCheck { diff, largest, threshold, passed: diff <= threshold && !is.is_nan() }
}

/// Detail of a failed comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch<T> {
    /// `sum`, `a`, `b` or `c`.
    pub name: &'static str,
    /// Element index; `None` for the dot result.
    pub index: Option<usize>,
    pub is: T,
    pub should: T,
    pub diff: T,
    pub threshold: T,
    pub largest: T,
    pub max_rel: T,
}

impl<T: fmt::Display> fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FAILED validation of {}", self.name)?;
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        write!(
            f,
            ": {} (is) != {} (should), diff={} > {} (largest={}, max_rel={})",
            self.is, self.should, self.diff, self.threshold, self.largest, self.max_rel
        )
    }
}

/// Failure count plus the first [`MAX_DIAGNOSTICS`] mismatches.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport<T> {
    pub failures: usize,
    pub diagnostics: Vec<Mismatch<T>>,
}

impl<T> Default for ValidationReport<T> {
    fn default() -> Self {
        Self { failures: 0, diagnostics: Vec::new() }
    }
}

impl<T: StreamElement> ValidationReport<T> {
    pub fn passed(&self) -> bool {
        self.failures == 0
    }

    /// Whether the run must end with a failure status.
    pub fn should_fail(&self, silence_errors: bool) -> bool {
        !self.passed() && !silence_errors
    }

    /// Compare one value, recording a mismatch if it fails.
    pub fn check(
        &mut self,
        name: &'static str,
        index: Option<usize>,
        is: T,
        should: T,
        max_rel: T,
    ) -> bool {
        let RelativeCheck { diff, largest, threshold, passed } =
            relative_check(is, should, max_rel);
        if passed {
            return true;
        }
        self.failures += 1;
        if self.diagnostics.len() < MAX_DIAGNOSTICS {
            let mismatch = Mismatch { name, index, is, should, diff, threshold, largest, max_rel };
            debug!("{mismatch}");
            self.diagnostics.push(mismatch);
        }
        false
    }
}

/// Compare backend output with `gold`.
///
/// The dot result is checked first, and only when the gold state expects one;
/// a missing result then counts as a failure. Arrays are checked element by
/// element with `a`, `b` and `c` interleaved.
pub fn validate<T: StreamElement>(
    arrays: ArrayView<'_, T>,
    sum: Option<T>,
    gold: &GoldState<T>,
) -> ValidationReport<T> {
    let mut report = ValidationReport::default();

    if let Some(expected) = gold.sum {
        report.check("sum", None, sum.unwrap_or_else(T::nan), expected, dot_tolerance());
    }

    let max_rel = array_tolerance();
    let (a, b, c) = (arrays.a, arrays.b, arrays.c);
    for i in 0..a.len().max(b.len()).max(c.len()) {
        for (name, array, should) in [("a", a, gold.a), ("b", b, gold.b), ("c", c, gold.c)] {
            let is = array.get(i).copied().unwrap_or_else(T::nan);
            report.check(name, Some(i), is, should, max_rel);
        }
    }

    if !report.passed() {
        let hidden = report.failures - report.diagnostics.len();
        warn!(failures = report.failures, hidden, "validation failed");
    }
    report
}

/// Replay the schedule described by `config` and validate against it.
pub fn check_solution<T: StreamElement>(
    config: &RunConfig,
    arrays: ArrayView<'_, T>,
    sum: Option<T>,
) -> ValidationReport<T> {
    let gold = GoldState::replay(&Schedule::from_config(config), config.array_size);
    validate(arrays, sum, &gold)
}
