//! Kernel schedules.
//!
//! A [`Schedule`] is the single description of which kernels run, in what
//! order and how often. The timing harness and the reference model are both
//! [`ScheduleExecutor`]s of the same schedule, so they cannot disagree on
//! ordering.

use memstream_common::{BenchOrder, Benchmark, RunConfig, Selection};

/// One scheduled unit of work: run `bench` `repeats` times back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub bench: &'static Benchmark,
    pub repeats: usize,
}

/// Something that can carry out a [`Step`].
pub trait ScheduleExecutor {
    type Error;

    fn execute(&mut self, step: Step) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    selection: Selection,
    order: BenchOrder,
    num_times: usize,
}

impl Schedule {
    /// Build a schedule. `num_times` is not checked here; [`RunConfig`]
    /// enforces the lower bound before anything is executed.
    pub fn new(selection: Selection, order: BenchOrder, num_times: usize) -> Self {
        Self { selection, order, num_times }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.selection, config.order, config.num_times)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn order(&self) -> BenchOrder {
        self.order
    }

    pub fn num_times(&self) -> usize {
        self.num_times
    }

    /// Steps in execution order.
    ///
    /// Classic: `num_times` passes over the active kernels, one call each.
    /// Isolated: one step per active kernel carrying all `num_times` calls.
    pub fn steps(&self) -> Box<dyn Iterator<Item = Step>> {
        let Self { selection, order, num_times } = *self;
        match order {
            BenchOrder::Classic => Box::new((0..num_times).flat_map(move |_| {
                selection.active().map(|bench| Step { bench, repeats: 1 })
            })),
            BenchOrder::Isolated => {
                Box::new(selection.active().map(move |bench| Step { bench, repeats: num_times }))
            }
        }
    }

    /// Total kernel invocations over the whole schedule.
    pub fn total_calls(&self) -> usize {
        self.selection.active().count() * self.num_times
    }

    /// Feed every step to `executor`, stopping at the first error.
    pub fn drive<E: ScheduleExecutor>(&self, executor: &mut E) -> Result<(), E::Error> {
        for step in self.steps() {
            executor.execute(step)?;
        }
        Ok(())
    }
}
