//! Scalar reference model.
//!
//! Every kernel applies the same update to every element, so an array's
//! expected contents collapse to one scalar. Replaying the schedule over
//! those scalars predicts the final state of any correct backend.

use std::convert::Infallible;

use memstream_common::{BenchId, START_A, START_B, START_C, START_SCALAR, StreamElement};

use crate::schedule::{Schedule, ScheduleExecutor, Step};

/// Expected value of every element of `a`, `b` and `c`, plus the dot result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldState<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    /// Set once Dot has been replayed.
    pub sum: Option<T>,
    scalar: T,
    array_size: usize,
}

impl<T: StreamElement> GoldState<T> {
    /// Gold values seeded from the start constants.
    pub fn new(array_size: usize) -> Self {
        Self::with_start(
            array_size,
            T::from_f64_lossy(START_A),
            T::from_f64_lossy(START_B),
            T::from_f64_lossy(START_C),
        )
    }

    pub fn with_start(array_size: usize, a: T, b: T, c: T) -> Self {
        Self { a, b, c, sum: None, scalar: T::from_f64_lossy(START_SCALAR), array_size }
    }

    /// Replay `schedule` from the start constants.
    pub fn replay(schedule: &Schedule, array_size: usize) -> Self {
        let mut gold = Self::new(array_size);
        match schedule.drive(&mut gold) {
            Ok(()) => gold,
            Err(never) => match never {},
        }
    }

    /// Apply one kernel's update rule.
    pub fn apply(&mut self, id: BenchId) {
        let scalar = self.scalar;
        match id {
            BenchId::Copy => self.c = self.a,
            BenchId::Mul => self.b = scalar * self.c,
            BenchId::Add => self.c = self.a + self.b,
            BenchId::Triad => self.a = self.b + scalar * self.c,
            BenchId::Nstream => self.a = self.a + (self.b + scalar * self.c),
            // All terms are equal, so the product is exact where accumulation is not.
            BenchId::Dot => {
                self.sum = Some(self.a * self.b * T::from_f64_lossy(self.array_size as f64))
            }
        }
    }
}

impl<T: StreamElement> ScheduleExecutor for GoldState<T> {
    type Error = Infallible;

    fn execute(&mut self, step: Step) -> Result<(), Infallible> {
        for _ in 0..step.repeats {
            self.apply(step.bench.id);
        }
        Ok(())
    }
}
