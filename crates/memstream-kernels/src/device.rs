//! Device enumeration shared by the backends.

use memstream_common::{Precision, Result, StreamError};

/// One device a backend can run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub driver: String,
    /// Worker threads (CPU) or compute units available to a kernel.
    pub compute_units: usize,
    pub supports_double: bool,
}

impl DeviceInfo {
    /// The host CPU as seen by a backend using `threads` workers.
    pub fn host_cpu(label: &str, threads: usize) -> Self {
        Self {
            name: format!("{label} ({threads} thread{})", if threads == 1 { "" } else { "s" }),
            driver: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            compute_units: threads.max(1),
            supports_double: true,
        }
    }

    pub fn supports(&self, precision: Precision) -> bool {
        match precision {
            Precision::Single => true,
            Precision::Double => self.supports_double,
        }
    }
}

/// Look up device `index` and make sure it can run `precision`.
pub fn check_device(
    devices: &[DeviceInfo],
    index: usize,
    precision: Precision,
) -> Result<&DeviceInfo> {
    let device =
        devices.get(index).ok_or(StreamError::InvalidDevice { index, available: devices.len() })?;
    if !device.supports(precision) {
        return Err(StreamError::UnsupportedPrecision { device: device.name.clone(), precision });
    }
    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_only() -> DeviceInfo {
        DeviceInfo {
            name: "fp32 accelerator".to_string(),
            driver: "test".to_string(),
            compute_units: 16,
            supports_double: false,
        }
    }

    #[test]
    fn host_cpu_supports_both_precisions() {
        let cpu = DeviceInfo::host_cpu("CPU", 4);
        assert!(cpu.supports(Precision::Single));
        assert!(cpu.supports(Precision::Double));
        assert_eq!(cpu.name, "CPU (4 threads)");
        assert_eq!(DeviceInfo::host_cpu("CPU", 1).name, "CPU (1 thread)");
    }

    #[test]
    fn check_device_rejects_missing_double_support() {
        let devices = [single_only()];
        assert!(check_device(&devices, 0, Precision::Single).is_ok());
        let err = check_device(&devices, 0, Precision::Double).unwrap_err();
        assert!(matches!(
            err,
            StreamError::UnsupportedPrecision { precision: Precision::Double, .. }
        ));
    }

    #[test]
    fn check_device_rejects_out_of_range_index() {
        let devices = [DeviceInfo::host_cpu("CPU", 2)];
        let err = check_device(&devices, 1, Precision::Single).unwrap_err();
        assert!(matches!(err, StreamError::InvalidDevice { index: 1, available: 1 }));
    }

    #[test]
    fn check_device_on_empty_list() {
        let err = check_device(&[], 0, Precision::Double).unwrap_err();
        assert!(matches!(err, StreamError::InvalidDevice { index: 0, available: 0 }));
    }
}
