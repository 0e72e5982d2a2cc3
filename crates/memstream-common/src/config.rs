//! Run configuration
//!
//! A [`RunConfig`] is built once from parsed arguments and passed explicitly
//! to the harness and validator. It is validated on construction, so a value
//! of this type always describes a runnable benchmark.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bench::Selection;
use crate::element::Precision;
use crate::error::ConfigError;
use crate::{DEFAULT_ARRAY_SIZE, DEFAULT_NUM_TIMES};

/// Temporal order in which selected kernels run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BenchOrder {
    /// Run every selected kernel once, in registry order, and repeat.
    #[default]
    Classic,
    /// Run each selected kernel `num_times` back to back before the next one.
    Isolated,
}

impl fmt::Display for BenchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchOrder::Classic => f.write_str("Classic"),
            BenchOrder::Isolated => f.write_str("Isolated"),
        }
    }
}

impl FromStr for BenchOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Classic" => Ok(BenchOrder::Classic),
            "Isolated" => Ok(BenchOrder::Isolated),
            other => Err(ConfigError::UnknownOrder(other.to_string())),
        }
    }
}

/// Immutable description of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub selection: Selection,
    pub order: BenchOrder,
    pub array_size: usize,
    /// Repetitions per kernel; the first is discarded as a cold start.
    pub num_times: usize,
    pub device: usize,
    pub precision: Precision,
    /// Count validation failures without failing the run.
    pub silence_errors: bool,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Re-check the invariants enforced by [`RunConfigBuilder::build`].
    ///
    /// Fields are public, so consumers that accept a `RunConfig` from outside
    /// call this before touching a backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_array_size(i64::try_from(self.array_size).unwrap_or(i64::MAX))?;
        check_num_times(self.num_times)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            selection: Selection::Classic,
            order: BenchOrder::Classic,
            array_size: DEFAULT_ARRAY_SIZE as usize,
            num_times: DEFAULT_NUM_TIMES,
            device: 0,
            precision: Precision::Double,
            silence_errors: false,
        }
    }
}

/// Builder for [`RunConfig`].
///
/// The array size is taken as a signed value so that negative sizes coming
/// from the command line are reported rather than wrapped.
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    selection: Selection,
    order: BenchOrder,
    array_size: i64,
    num_times: usize,
    device: usize,
    precision: Precision,
    silence_errors: bool,
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self {
            selection: Selection::Classic,
            order: BenchOrder::Classic,
            array_size: DEFAULT_ARRAY_SIZE,
            num_times: DEFAULT_NUM_TIMES,
            device: 0,
            precision: Precision::Double,
            silence_errors: false,
        }
    }
}

impl RunConfigBuilder {
    pub fn selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn order(mut self, order: BenchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn array_size(mut self, array_size: i64) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn num_times(mut self, num_times: usize) -> Self {
        self.num_times = num_times;
        self
    }

    pub fn device(mut self, device: usize) -> Self {
        self.device = device;
        self
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn silence_errors(mut self, silence_errors: bool) -> Self {
        self.silence_errors = silence_errors;
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        check_array_size(self.array_size)?;
        check_num_times(self.num_times)?;
        let array_size = usize::try_from(self.array_size)
            .map_err(|_| ConfigError::InvalidArraySize(self.array_size))?;
        Ok(RunConfig {
            selection: self.selection,
            order: self.order,
            array_size,
            num_times: self.num_times,
            device: self.device,
            precision: self.precision,
            silence_errors: self.silence_errors,
        })
    }
}

fn check_array_size(array_size: i64) -> Result<(), ConfigError> {
    if array_size <= 0 {
        return Err(ConfigError::InvalidArraySize(array_size));
    }
    Ok(())
}

fn check_num_times(num_times: usize) -> Result<(), ConfigError> {
    if num_times < 2 {
        return Err(ConfigError::InvalidNumTimes(num_times));
    }
    Ok(())
}
