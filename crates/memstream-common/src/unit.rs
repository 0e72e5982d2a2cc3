//! Byte units used when printing bandwidth and array sizes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Unit of memory for reported sizes and bandwidths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    /// 10^6 bytes.
    #[default]
    MegaByte,
    /// 2^20 bytes.
    MibiByte,
    /// 10^9 bytes.
    GigaByte,
    /// 2^30 bytes.
    GibiByte,
    /// 10^12 bytes.
    TeraByte,
    /// 2^40 bytes.
    TebiByte,
}

impl Unit {
    /// Number of bytes in one unit.
    pub const fn factor(self) -> f64 {
        match self {
            Unit::MegaByte => 1e6,
            Unit::MibiByte => 1_048_576.0,
            Unit::GigaByte => 1e9,
            Unit::GibiByte => 1_073_741_824.0,
            Unit::TeraByte => 1e12,
            Unit::TebiByte => 1_099_511_627_776.0,
        }
    }

    /// Convert a byte count into this unit.
    pub fn scale(self, bytes: f64) -> f64 {
        bytes / self.factor()
    }

    /// Unit suffix, e.g. `MB`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Unit::MegaByte => "MB",
            Unit::MibiByte => "MiB",
            Unit::GigaByte => "GB",
            Unit::GibiByte => "GiB",
            Unit::TeraByte => "TB",
            Unit::TebiByte => "TiB",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MB" => Ok(Unit::MegaByte),
            "MiB" => Ok(Unit::MibiByte),
            "GB" => Ok(Unit::GigaByte),
            "GiB" => Ok(Unit::GibiByte),
            "TB" => Ok(Unit::TeraByte),
            "TiB" => Ok(Unit::TebiByte),
            other => Err(ConfigError::UnknownUnit(other.to_string())),
        }
    }
}
