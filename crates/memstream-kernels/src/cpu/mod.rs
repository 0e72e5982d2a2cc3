//! CPU kernel implementations

use memstream_common::{Result, StreamError};

pub mod serial;

#[cfg(feature = "rayon")]
pub mod parallel;

pub use serial::SerialStream;

#[cfg(feature = "rayon")]
pub use parallel::{RayonOptions, RayonStream};

/// Empty vector with room for exactly `len` elements.
///
/// Oversized requests surface as [`StreamError::Allocation`] instead of
/// aborting the process.
pub(crate) fn try_alloc<T>(array: &'static str, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|e| StreamError::Allocation {
        array,
        elements: len,
        reason: e.to_string(),
    })?;
    Ok(v)
}
