//! Element precision abstraction.

use std::fmt;
use std::iter::Sum;

use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};

/// Floating-point precision selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => f.write_str("single"),
            Precision::Double => f.write_str("double"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Array element type: `f32` or `f64`.
pub trait StreamElement:
    Float
    + FromPrimitive
    + Sum
    + Default
    + Send
    + Sync
    + fmt::Debug
    + fmt::Display
    + 'static
    + sealed::Sealed
{
    const PRECISION: Precision;

    /// Convert one of the process-wide `f64` constants to this precision.
    fn from_f64_lossy(v: f64) -> Self;

    /// Widen to `f64` for reporting.
    fn as_f64(self) -> f64;

    /// Byte size of one element.
    fn size_of() -> usize {
        std::mem::size_of::<Self>()
    }

    /// Short name used in headers: `float` or `double`.
    fn type_name() -> &'static str {
        match Self::PRECISION {
            Precision::Single => "float",
            Precision::Double => "double",
        }
    }
}

impl StreamElement for f32 {
    const PRECISION: Precision = Precision::Single;

    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl StreamElement for f64 {
    const PRECISION: Precision = Precision::Double;

    #[inline]
    fn from_f64_lossy(v: f64) -> Self {
        v
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
