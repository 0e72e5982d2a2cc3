//! Streaming kernels for memstream
//!
//! Every backend implements [`StreamKernels`]: it owns the three benchmark
//! arrays and executes the six streaming kernels over them. Backends are
//! compiled in through cargo features and chosen at startup with
//! [`KernelBackend`].

use std::fmt;
use std::str::FromStr;

use memstream_common::{ConfigError, Result, Selection, StreamElement, StreamError};

pub mod cpu;
pub mod device;

pub use device::{DeviceInfo, check_device};

/// Environment variable overriding the default backend.
pub const BACKEND_ENV: &str = "MEMSTREAM_BACKEND";

/// Read-only views of the three arrays after execution.
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a, T> {
    pub a: &'a [T],
    pub b: &'a [T],
    pub c: &'a [T],
}

/// Kernel contract every backend must satisfy.
///
/// All methods block until their effects are visible to the next call on the
/// same instance. Timing wraps each call, so a backend with asynchronous
/// queues must drain them before returning.
pub trait StreamKernels<T: StreamElement>: Send {
    /// Short backend name, e.g. `serial`.
    fn name(&self) -> &'static str;

    /// Number of elements in each array.
    fn array_size(&self) -> usize;

    /// Fill `a`, `b` and `c` with the given constants.
    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<()>;

    /// `c[i] = a[i]`
    fn copy(&mut self) -> Result<()>;

    /// `b[i] = scalar * c[i]`
    fn mul(&mut self) -> Result<()>;

    /// `c[i] = a[i] + b[i]`
    fn add(&mut self) -> Result<()>;

    /// `a[i] = b[i] + scalar * c[i]`
    fn triad(&mut self) -> Result<()>;

    /// `a[i] += b[i] + scalar * c[i]`
    fn nstream(&mut self) -> Result<()>;

    /// Sum of `a[i] * b[i]`.
    fn dot(&mut self) -> Result<T>;

    /// Current array contents, synchronised to the host.
    fn get_arrays(&mut self) -> Result<ArrayView<'_, T>>;
}

/// The kernel backend variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KernelBackend {
    /// Single-threaded loops; always compiled.
    Serial,
    /// Data-parallel loops on a rayon thread pool.
    Rayon,
}

impl fmt::Display for KernelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelBackend::Serial => write!(f, "serial"),
            KernelBackend::Rayon => write!(f, "rayon"),
        }
    }
}

impl FromStr for KernelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(KernelBackend::Serial),
            "rayon" => Ok(KernelBackend::Rayon),
            _ => Err(ConfigError::UnknownBackend {
                name: s.to_string(),
                available: compiled_backends()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

impl KernelBackend {
    /// Returns true if this backend is compiled in the current build.
    pub fn is_compiled(self) -> bool {
        match self {
            KernelBackend::Serial => true,
            KernelBackend::Rayon => cfg!(feature = "rayon"),
        }
    }

    /// Best compiled backend (parallel before serial).
    pub fn best_available() -> Self {
        if KernelBackend::Rayon.is_compiled() {
            KernelBackend::Rayon
        } else {
            KernelBackend::Serial
        }
    }

    /// Backend named by `MEMSTREAM_BACKEND`, if set and non-empty.
    pub fn from_env() -> std::result::Result<Option<Self>, ConfigError> {
        match std::env::var(BACKEND_ENV) {
            Ok(v) if !v.trim().is_empty() => v.parse().map(Some),
            _ => Ok(None),
        }
    }

    /// Resolve the backend: explicit choice, then environment, then the
    /// configured name, then best compiled.
    ///
    /// `configured` is only parsed when neither of the first two is set.
    pub fn resolve(
        explicit: Option<Self>,
        configured: Option<&str>,
    ) -> std::result::Result<Self, ConfigError> {
        if let Some(backend) = explicit {
            return Ok(backend);
        }
        if let Some(backend) = Self::from_env()? {
            return Ok(backend);
        }
        match configured {
            Some(name) => name.parse(),
            None => Ok(Self::best_available()),
        }
    }

    /// Devices this backend can run on.
    pub fn devices(self) -> Vec<DeviceInfo> {
        match self {
            KernelBackend::Serial => cpu::serial::devices(),
            #[cfg(feature = "rayon")]
            KernelBackend::Rayon => cpu::parallel::devices(),
            #[cfg(not(feature = "rayon"))]
            KernelBackend::Rayon => Vec::new(),
        }
    }
}

/// Backends compiled into this build, best first.
pub fn compiled_backends() -> Vec<KernelBackend> {
    [KernelBackend::Rayon, KernelBackend::Serial].into_iter().filter(|b| b.is_compiled()).collect()
}

/// Construct a backend instance with its arrays initialised.
///
/// Fails if the backend is not compiled, the device index is out of range, or
/// the device cannot hold elements of type `T`.
pub fn make_stream<T: StreamElement>(
    backend: KernelBackend,
    selection: Selection,
    array_size: usize,
    device: usize,
    init_a: T,
    init_b: T,
    init_c: T,
) -> Result<Box<dyn StreamKernels<T>>> {
    if !backend.is_compiled() {
        return Err(StreamError::BackendUnavailable(backend.to_string()));
    }
    tracing::info!(
        %backend,
        array_size,
        device,
        precision = %T::PRECISION,
        "constructing stream backend"
    );
    match backend {
        KernelBackend::Serial => Ok(Box::new(cpu::SerialStream::new(
            selection, array_size, device, init_a, init_b, init_c,
        )?)),
        #[cfg(feature = "rayon")]
        KernelBackend::Rayon => Ok(Box::new(cpu::RayonStream::with_options(
            selection,
            array_size,
            device,
            init_a,
            init_b,
            init_c,
            cpu::RayonOptions::from_env(),
        )?)),
        #[cfg(not(feature = "rayon"))]
        KernelBackend::Rayon => Err(StreamError::BackendUnavailable(backend.to_string())),
    }
}

/// Devices of `backend`, one line per device: `index: name`.
pub fn list_devices(backend: KernelBackend) -> Vec<String> {
    backend.devices().iter().enumerate().map(|(i, d)| format!("{i}: {}", d.name)).collect()
}

/// Display name of device `index` of `backend`.
pub fn device_name(backend: KernelBackend, index: usize) -> Result<String> {
    let devices = backend.devices();
    devices
        .get(index)
        .map(|d| d.name.clone())
        .ok_or(StreamError::InvalidDevice { index, available: devices.len() })
}

/// Driver string of device `index` of `backend`.
pub fn device_driver(backend: KernelBackend, index: usize) -> Result<String> {
    let devices = backend.devices();
    devices
        .get(index)
        .map(|d| d.driver.clone())
        .ok_or(StreamError::InvalidDevice { index, available: devices.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_backend_display() {
        assert_eq!(KernelBackend::Serial.to_string(), "serial");
        assert_eq!(KernelBackend::Rayon.to_string(), "rayon");
    }

    #[test]
    fn parse_backend_is_case_insensitive() {
        assert_eq!("Serial".parse::<KernelBackend>().unwrap(), KernelBackend::Serial);
        assert_eq!(" rayon ".parse::<KernelBackend>().unwrap(), KernelBackend::Rayon);
        assert!(matches!("cuda".parse::<KernelBackend>(), Err(ConfigError::UnknownBackend { .. })));
    }

    #[test]
    fn serial_always_compiled() {
        assert!(KernelBackend::Serial.is_compiled());
        assert!(compiled_backends().contains(&KernelBackend::Serial));
    }

    #[test]
    fn best_available_prefers_parallel() {
        #[cfg(feature = "rayon")]
        assert_eq!(KernelBackend::best_available(), KernelBackend::Rayon);
        #[cfg(not(feature = "rayon"))]
        assert_eq!(KernelBackend::best_available(), KernelBackend::Serial);
    }

    #[test]
    fn explicit_backend_wins() {
        let chosen = KernelBackend::resolve(Some(KernelBackend::Serial), Some("rayon")).unwrap();
        assert_eq!(chosen, KernelBackend::Serial);
    }

    #[test]
    fn serial_lists_one_device() {
        let lines = list_devices(KernelBackend::Serial);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("0: "));
    }

    #[test]
    fn device_queries_reject_out_of_range() {
        assert!(device_name(KernelBackend::Serial, 0).is_ok());
        assert!(device_driver(KernelBackend::Serial, 0).is_ok());
        assert!(matches!(
            device_name(KernelBackend::Serial, 7),
            Err(StreamError::InvalidDevice { index: 7, available: 1 })
        ));
    }

    #[test]
    fn make_stream_initialises_arrays() {
        let mut stream =
            make_stream::<f64>(KernelBackend::Serial, Selection::Classic, 8, 0, 0.1, 0.2, 0.0)
                .unwrap();
        assert_eq!(stream.name(), "serial");
        assert_eq!(stream.array_size(), 8);
        let view = stream.get_arrays().unwrap();
        assert!(view.a.iter().all(|&x| x == 0.1));
        assert!(view.b.iter().all(|&x| x == 0.2));
        assert!(view.c.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn make_stream_reports_allocation_failure() {
        let err = make_stream::<f64>(
            KernelBackend::Serial,
            Selection::Classic,
            usize::MAX / 2,
            0,
            0.1,
            0.2,
            0.0,
        )
        .err()
        .unwrap();
        assert!(matches!(err, StreamError::Allocation { .. }), "{err}");
    }

    #[test]
    fn make_stream_rejects_bad_device() {
        let err = make_stream::<f32>(KernelBackend::Serial, Selection::All, 8, 3, 0.1, 0.2, 0.0)
            .err()
            .unwrap();
        assert!(matches!(err, StreamError::InvalidDevice { index: 3, .. }));
    }
}
