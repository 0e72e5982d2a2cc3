//! Kernel registry: single source of truth for the streaming kernels.
//!
//! [`BENCHMARKS`] is ordered. Both the timing harness and the reference model
//! walk it front to back, so the order below is the order kernels run in and
//! the order their effects are replayed during validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Identifies one streaming kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BenchId {
    /// `c[i] = a[i]`
    Copy,
    /// `b[i] = scalar * c[i]`
    Mul,
    /// `c[i] = a[i] + b[i]`
    Add,
    /// `a[i] = b[i] + scalar * c[i]`
    Triad,
    /// `sum += a[i] * b[i]`
    Dot,
    /// `a[i] += b[i] + scalar * c[i]`
    Nstream,
}

impl BenchId {
    /// Descriptor for this kernel.
    pub fn descriptor(self) -> &'static Benchmark {
        // BENCHMARKS is indexed in declaration order of BenchId.
        &BENCHMARKS[self.position()]
    }

    /// Position of this kernel in [`BENCHMARKS`].
    pub const fn position(self) -> usize {
        match self {
            BenchId::Copy => 0,
            BenchId::Mul => 1,
            BenchId::Add => 2,
            BenchId::Triad => 3,
            BenchId::Dot => 4,
            BenchId::Nstream => 5,
        }
    }

    /// Human-readable label, as printed in result tables.
    pub fn label(self) -> &'static str {
        self.descriptor().label
    }
}

impl fmt::Display for BenchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable description of one kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Benchmark {
    pub id: BenchId,
    pub label: &'static str,
    /// Array elements moved per element processed:
    /// `bytes = weight * size_of::<T>() * array_size`.
    pub weight: usize,
    /// One of Copy, Mul, Add, Triad, Dot.
    pub classic: bool,
}

/// Number of registered kernels.
pub const NUM_BENCHMARKS: usize = 6;

/// Kernels in canonical execution and validation order.
pub static BENCHMARKS: [Benchmark; NUM_BENCHMARKS] = [
    Benchmark { id: BenchId::Copy, label: "Copy", weight: 2, classic: true },
    Benchmark { id: BenchId::Mul, label: "Mul", weight: 2, classic: true },
    Benchmark { id: BenchId::Add, label: "Add", weight: 3, classic: true },
    Benchmark { id: BenchId::Triad, label: "Triad", weight: 3, classic: true },
    Benchmark { id: BenchId::Dot, label: "Dot", weight: 2, classic: true },
    Benchmark { id: BenchId::Nstream, label: "Nstream", weight: 4, classic: false },
];

/// Which kernels a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Selection {
    /// A single kernel.
    Only(BenchId),
    /// Copy, Mul, Add, Triad and Dot.
    #[default]
    Classic,
    /// Every registered kernel.
    All,
}

impl Selection {
    /// Descriptors this selection activates, in canonical order.
    pub fn active(self) -> impl Iterator<Item = &'static Benchmark> {
        BENCHMARKS.iter().filter(move |b| run_benchmark(self, b))
    }

    /// Every name accepted by [`Selection::from_str`], comma separated.
    pub fn valid_names() -> String {
        let mut names = vec!["All", "Classic"];
        names.extend(BENCHMARKS.iter().map(|b| b.label));
        names.join(", ")
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Only(id) => write!(f, "{id}"),
            Selection::Classic => f.write_str("Classic"),
            Selection::All => f.write_str("All"),
        }
    }
}

impl FromStr for Selection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Selection::All),
            "Classic" => Ok(Selection::Classic),
            _ => BENCHMARKS
                .iter()
                .find(|b| b.label == s)
                .map(|b| Selection::Only(b.id))
                .ok_or_else(|| ConfigError::UnknownBenchmark {
                    name: s.to_string(),
                    available: Selection::valid_names(),
                }),
        }
    }
}

/// Returns true if `bench` is part of `selection`.
pub fn run_benchmark(selection: Selection, bench: &Benchmark) -> bool {
    match selection {
        Selection::All => true,
        Selection::Classic => bench.classic,
        Selection::Only(id) => bench.id == id,
    }
}

/// One of the three benchmark arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Buffer {
    A,
    B,
    C,
}

/// Whether `selection` reads or writes `buffer`.
///
/// Backends that allocate lazily may skip buffers for which this is false.
pub fn needs_buffer(selection: Selection, buffer: Buffer) -> bool {
    use Buffer::{A, B, C};
    match selection {
        Selection::All | Selection::Classic => true,
        Selection::Only(BenchId::Copy) => matches!(buffer, A | C),
        Selection::Only(BenchId::Mul) => matches!(buffer, B | C),
        Selection::Only(BenchId::Dot) => matches!(buffer, A | B),
        Selection::Only(BenchId::Add | BenchId::Triad | BenchId::Nstream) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_is_canonical() {
        let ids: Vec<BenchId> = BENCHMARKS.iter().map(|b| b.id).collect();
        assert_eq!(
            ids,
            [
                BenchId::Copy,
                BenchId::Mul,
                BenchId::Add,
                BenchId::Triad,
                BenchId::Dot,
                BenchId::Nstream
            ]
        );
    }

    #[test]
    fn position_matches_registry_index() {
        for (i, b) in BENCHMARKS.iter().enumerate() {
            assert_eq!(b.id.position(), i);
            assert_eq!(b.id.descriptor(), b);
        }
    }

    #[test]
    fn weights_match_element_traffic() {
        let weights: Vec<usize> = BENCHMARKS.iter().map(|b| b.weight).collect();
        assert_eq!(weights, [2, 2, 3, 3, 2, 4]);
    }

    #[test]
    fn classic_excludes_nstream() {
        let classic: Vec<BenchId> = Selection::Classic.active().map(|b| b.id).collect();
        assert_eq!(classic.len(), 5);
        assert!(!classic.contains(&BenchId::Nstream));
    }

    #[test]
    fn all_activates_every_kernel() {
        assert_eq!(Selection::All.active().count(), NUM_BENCHMARKS);
    }

    #[test]
    fn only_activates_one_kernel() {
        let active: Vec<BenchId> =
            Selection::Only(BenchId::Triad).active().map(|b| b.id).collect();
        assert_eq!(active, [BenchId::Triad]);
    }

    #[test]
    fn parse_selection_names() {
        assert_eq!("All".parse::<Selection>().unwrap(), Selection::All);
        assert_eq!("Classic".parse::<Selection>().unwrap(), Selection::Classic);
        assert_eq!("Nstream".parse::<Selection>().unwrap(), Selection::Only(BenchId::Nstream));
    }

    #[test]
    fn parse_selection_is_case_sensitive() {
        let err = "copy".parse::<Selection>().unwrap_err();
        assert!(err.to_string().contains("All, Classic, Copy, Mul, Add, Triad, Dot, Nstream"));
    }

    #[test]
    fn needs_buffer_per_kernel() {
        use Buffer::*;
        let copy = Selection::Only(BenchId::Copy);
        assert!(needs_buffer(copy, A) && !needs_buffer(copy, B) && needs_buffer(copy, C));
        let mul = Selection::Only(BenchId::Mul);
        assert!(!needs_buffer(mul, A) && needs_buffer(mul, B) && needs_buffer(mul, C));
        let dot = Selection::Only(BenchId::Dot);
        assert!(needs_buffer(dot, A) && needs_buffer(dot, B) && !needs_buffer(dot, C));
        for b in [A, B, C] {
            assert!(needs_buffer(Selection::Classic, b));
            assert!(needs_buffer(Selection::Only(BenchId::Nstream), b));
        }
    }
}
