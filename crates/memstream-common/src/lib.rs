//! Common types, registry and configuration for memstream
//!
//! This crate provides the foundational types shared across the memstream
//! workspace: the kernel registry, the immutable run configuration, the error
//! taxonomy and the element precision abstraction.

pub mod bench;
pub mod config;
pub mod element;
pub mod error;
pub mod unit;

pub use bench::{
    BENCHMARKS, BenchId, Benchmark, Buffer, NUM_BENCHMARKS, Selection, needs_buffer, run_benchmark,
};
pub use config::{BenchOrder, RunConfig, RunConfigBuilder};
pub use element::{Precision, StreamElement};
pub use error::{ConfigError, Result, StreamError};
pub use unit::Unit;

/// Initial value of every element of array `a`.
pub const START_A: f64 = 0.1;
/// Initial value of every element of array `b`.
pub const START_B: f64 = 0.2;
/// Initial value of every element of array `c`.
pub const START_C: f64 = 0.0;
/// Scalar used by the mul, triad and nstream kernels.
pub const START_SCALAR: f64 = 0.4;

/// Default number of elements per array (2^25).
pub const DEFAULT_ARRAY_SIZE: i64 = 33_554_432;
/// Default number of repetitions.
pub const DEFAULT_NUM_TIMES: usize = 100;
