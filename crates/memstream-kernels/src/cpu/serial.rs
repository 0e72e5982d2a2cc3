//! Serial CPU backend
//!
//! Plain single-threaded loops over host memory. Always available and used
//! as the reference when checking the parallel backend.

use memstream_common::{Result, START_SCALAR, Selection, StreamElement};

use super::try_alloc;
use crate::device::{DeviceInfo, check_device};
use crate::{ArrayView, StreamKernels};

/// Devices of the serial backend: the host CPU, one thread.
pub fn devices() -> Vec<DeviceInfo> {
    vec![DeviceInfo::host_cpu("CPU (serial)", 1)]
}

/// Single-threaded backend holding the arrays in host vectors.
pub struct SerialStream<T> {
    a: Vec<T>,
    b: Vec<T>,
    c: Vec<T>,
    scalar: T,
}

impl<T: StreamElement> SerialStream<T> {
    pub fn new(
        _selection: Selection,
        array_size: usize,
        device: usize,
        init_a: T,
        init_b: T,
        init_c: T,
    ) -> Result<Self> {
        check_device(&devices(), device, T::PRECISION)?;
        Ok(Self {
            a: filled("a", array_size, init_a)?,
            b: filled("b", array_size, init_b)?,
            c: filled("c", array_size, init_c)?,
            scalar: T::from_f64_lossy(START_SCALAR),
        })
    }
}

fn filled<T: Copy>(array: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut v = try_alloc(array, len)?;
    v.resize(len, value);
    Ok(v)
}

impl<T: StreamElement> StreamKernels<T> for SerialStream<T> {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn array_size(&self) -> usize {
        self.a.len()
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<()> {
        self.a.fill(init_a);
        self.b.fill(init_b);
        self.c.fill(init_c);
        Ok(())
    }

    fn copy(&mut self) -> Result<()> {
        self.c.copy_from_slice(&self.a);
        Ok(())
    }

    fn mul(&mut self) -> Result<()> {
        let scalar = self.scalar;
        for (b, &c) in self.b.iter_mut().zip(&self.c) {
            *b = scalar * c;
        }
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        for ((c, &a), &b) in self.c.iter_mut().zip(&self.a).zip(&self.b) {
            *c = a + b;
        }
        Ok(())
    }

    fn triad(&mut self) -> Result<()> {
        let scalar = self.scalar;
        for ((a, &b), &c) in self.a.iter_mut().zip(&self.b).zip(&self.c) {
            *a = b + scalar * c;
        }
        Ok(())
    }

    fn nstream(&mut self) -> Result<()> {
        let scalar = self.scalar;
        for ((a, &b), &c) in self.a.iter_mut().zip(&self.b).zip(&self.c) {
            *a = *a + (b + scalar * c);
        }
        Ok(())
    }

    fn dot(&mut self) -> Result<T> {
        Ok(self.a.iter().zip(&self.b).fold(T::zero(), |sum, (&a, &b)| sum + a * b))
    }

    fn get_arrays(&mut self) -> Result<ArrayView<'_, T>> {
        Ok(ArrayView { a: &self.a, b: &self.b, c: &self.c })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memstream_common::StreamError;

    fn stream(n: usize) -> SerialStream<f64> {
        SerialStream::new(Selection::All, n, 0, 0.1, 0.2, 0.0).unwrap()
    }

    #[test]
    fn copy_moves_a_into_c() {
        let mut s = stream(4);
        s.copy().unwrap();
        let v = s.get_arrays().unwrap();
        assert_eq!(v.c, &[0.1; 4]);
        assert_eq!(v.a, &[0.1; 4]);
        assert_eq!(v.b, &[0.2; 4]);
    }

    #[test]
    fn mul_scales_c_into_b() {
        let mut s = stream(3);
        s.init_arrays(1.0, 0.0, 2.5).unwrap();
        s.mul().unwrap();
        assert_eq!(s.get_arrays().unwrap().b, &[0.4 * 2.5; 3]);
    }

    #[test]
    fn add_sums_a_and_b() {
        let mut s = stream(2);
        s.add().unwrap();
        assert_eq!(s.get_arrays().unwrap().c, &[0.1 + 0.2; 2]);
    }

    #[test]
    fn triad_overwrites_a() {
        let mut s = stream(2);
        s.init_arrays(9.0, 1.0, 2.0).unwrap();
        s.triad().unwrap();
        assert_eq!(s.get_arrays().unwrap().a, &[1.0 + 0.4 * 2.0; 2]);
    }

    #[test]
    fn nstream_accumulates_into_a() {
        let mut s = stream(2);
        s.init_arrays(9.0, 1.0, 2.0).unwrap();
        let step = 1.0 + 0.4 * 2.0;
        s.nstream().unwrap();
        assert_eq!(s.get_arrays().unwrap().a, &[9.0 + step; 2]);
        s.nstream().unwrap();
        assert_eq!(s.get_arrays().unwrap().a, &[9.0 + step + step; 2]);
    }

    #[test]
    fn dot_reduces_a_times_b() {
        let mut s = stream(4);
        s.init_arrays(2.0, 3.0, 0.0).unwrap();
        assert_eq!(s.dot().unwrap(), 24.0);
    }

    #[test]
    fn single_precision_instance() {
        let mut s = SerialStream::<f32>::new(Selection::Classic, 5, 0, 0.1, 0.2, 0.0).unwrap();
        s.copy().unwrap();
        assert_eq!(s.get_arrays().unwrap().c, &[0.1f32; 5]);
    }

    #[test]
    fn rejects_invalid_device() {
        assert!(SerialStream::<f64>::new(Selection::All, 4, 1, 0.1, 0.2, 0.0).is_err());
    }

    #[test]
    fn oversized_arrays_are_an_error() {
        let err = SerialStream::<f64>::new(Selection::All, usize::MAX / 2, 0, 0.1, 0.2, 0.0)
            .err()
            .unwrap();
        assert!(matches!(err, StreamError::Allocation { array: "a", .. }), "{err}");
    }
}
