//! Error types for memstream

use thiserror::Error;

use crate::element::Precision;

/// Configuration errors, detected before any backend is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid array size {0}: must be greater than 0")]
    InvalidArraySize(i64),

    #[error("invalid number of times {0}: must be 2 or more")]
    InvalidNumTimes(usize),

    #[error("unknown benchmark name \"{name}\"; available benchmarks: {available}")]
    UnknownBenchmark { name: String, available: String },

    #[error("unknown benchmark order \"{0}\"; options: \"Classic\" (default), \"Isolated\"")]
    UnknownOrder(String),

    #[error("unknown backend \"{name}\"; compiled backends: {available}")]
    UnknownBackend { name: String, available: String },

    #[error("unknown unit \"{0}\"; options: MB, MiB, GB, GiB, TB, TiB")]
    UnknownUnit(String),
}

/// Errors surfaced by backends and the benchmark harness.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid device index {index}: {available} device(s) available")]
    InvalidDevice { index: usize, available: usize },

    #[error("device {device} does not support {precision} precision")]
    UnsupportedPrecision { device: String, precision: Precision },

    #[error("cannot allocate {elements} elements for array {array}: {reason}")]
    Allocation { array: &'static str, elements: usize, reason: String },

    #[error("backend {0} is not compiled into this build")]
    BackendUnavailable(String),

    #[error("kernel {kernel} failed: {reason}")]
    Kernel { kernel: &'static str, reason: String },
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, StreamError>;
