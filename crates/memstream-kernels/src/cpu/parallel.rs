//! Data-parallel CPU backend on a dedicated rayon thread pool.
//!
//! Arrays are split into fixed-size chunks and each chunk is processed by one
//! task. The chunk size can be tuned at construction: trial runs of the
//! bandwidth kernels over candidate chunk sizes pick the fastest, after which
//! the arrays are re-initialised so measurement starts from the requested
//! state.

use std::time::Instant;

use memstream_common::{Result, START_SCALAR, Selection, StreamElement, StreamError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use super::try_alloc;
use crate::device::{DeviceInfo, check_device};
use crate::{ArrayView, StreamKernels};

/// Thread count override.
pub const NUM_THREADS_ENV: &str = "MEMSTREAM_NUM_THREADS";
/// Set to `1`/`true` to tune the chunk size at construction.
pub const AUTOTUNE_ENV: &str = "MEMSTREAM_AUTOTUNE";

/// Smallest chunk handed to a task.
const MIN_CHUNK: usize = 1024;
/// Candidate chunk sizes tried by the autotuner, in elements.
const AUTOTUNE_CANDIDATES: [usize; 5] = [4096, 16_384, 65_536, 262_144, 1_048_576];
/// Trial passes per candidate.
const AUTOTUNE_TRIALS: usize = 3;

/// Construction options for [`RayonStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RayonOptions {
    pub num_threads: usize,
    pub autotune: bool,
}

impl Default for RayonOptions {
    fn default() -> Self {
        Self { num_threads: num_cpus::get().max(1), autotune: false }
    }
}

impl RayonOptions {
    /// Defaults overridden by `MEMSTREAM_NUM_THREADS` and `MEMSTREAM_AUTOTUNE`.
    ///
    /// Unparseable or zero thread counts fall back to the CPU count.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(n) = std::env::var(NUM_THREADS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            opts.num_threads = n;
        }
        opts.autotune = std::env::var(AUTOTUNE_ENV)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        opts
    }
}

/// Devices of the rayon backend: the host CPU with every logical core.
pub fn devices() -> Vec<DeviceInfo> {
    vec![DeviceInfo::host_cpu("CPU (rayon)", RayonOptions::from_env().num_threads)]
}

/// Default chunk: one contiguous slice per thread, never below [`MIN_CHUNK`].
fn default_chunk(array_size: usize, threads: usize) -> usize {
    array_size.div_ceil(threads.max(1)).max(MIN_CHUNK)
}

/// Parallel backend holding the arrays in host vectors.
pub struct RayonStream<T> {
    pool: ThreadPool,
    a: Vec<T>,
    b: Vec<T>,
    c: Vec<T>,
    scalar: T,
    chunk: usize,
}

impl<T: StreamElement> RayonStream<T> {
    pub fn new(
        selection: Selection,
        array_size: usize,
        device: usize,
        init_a: T,
        init_b: T,
        init_c: T,
    ) -> Result<Self> {
        Self::with_options(
            selection,
            array_size,
            device,
            init_a,
            init_b,
            init_c,
            RayonOptions::default(),
        )
    }

    pub fn with_options(
        _selection: Selection,
        array_size: usize,
        device: usize,
        init_a: T,
        init_b: T,
        init_c: T,
        options: RayonOptions,
    ) -> Result<Self> {
        let devices = vec![DeviceInfo::host_cpu("CPU (rayon)", options.num_threads)];
        check_device(&devices, device, T::PRECISION)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(options.num_threads)
            .thread_name(|i| format!("memstream-{i}"))
            .build()
            .map_err(|e| StreamError::Kernel { kernel: "init", reason: e.to_string() })?;

        // First touch from the pool so pages land near the threads that use them.
        let (a, b, c) = pool.install(|| {
            let fill = |array: &'static str, v: T| -> Result<Vec<T>> {
                let mut out = try_alloc(array, array_size)?;
                out.par_extend((0..array_size).into_par_iter().map(|_| v));
                Ok(out)
            };
            Ok::<_, StreamError>((fill("a", init_a)?, fill("b", init_b)?, fill("c", init_c)?))
        })?;

        let mut stream = Self {
            pool,
            a,
            b,
            c,
            scalar: T::from_f64_lossy(START_SCALAR),
            chunk: default_chunk(array_size, options.num_threads),
        };

        if options.autotune {
            stream.autotune()?;
            stream.init_arrays(init_a, init_b, init_c)?;
        }

        info!(threads = options.num_threads, chunk = stream.chunk, "rayon backend ready");
        Ok(stream)
    }

    /// Chunk size currently used by every kernel.
    pub fn chunk_size(&self) -> usize {
        self.chunk
    }

    /// Pick the fastest chunk size for copy, mul, add and triad.
    ///
    /// Leaves the arrays in an arbitrary state; callers must re-initialise.
    pub fn autotune(&mut self) -> Result<usize> {
        let n = self.array_size();
        let mut candidates: Vec<usize> =
            AUTOTUNE_CANDIDATES.iter().copied().filter(|&c| c < n).collect();
        candidates.push(default_chunk(n, self.pool.current_num_threads()));

        let mut best = (self.chunk, f64::INFINITY);
        for chunk in candidates {
            self.chunk = chunk;
            let start = Instant::now();
            for _ in 0..AUTOTUNE_TRIALS {
                self.copy()?;
                self.mul()?;
                self.add()?;
                self.triad()?;
            }
            let elapsed = start.elapsed().as_secs_f64();
            debug!(chunk, elapsed, "autotune probe");
            if elapsed < best.1 {
                best = (chunk, elapsed);
            }
        }
        self.chunk = best.0;
        info!(chunk = self.chunk, "autotune selected chunk size");
        Ok(self.chunk)
    }
}

impl<T: StreamElement> StreamKernels<T> for RayonStream<T> {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn array_size(&self) -> usize {
        self.a.len()
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<()> {
        let Self { pool, a, b, c, chunk, .. } = self;
        let chunk = *chunk;
        pool.install(|| {
            a.par_chunks_mut(chunk).for_each(|x| x.fill(init_a));
            b.par_chunks_mut(chunk).for_each(|x| x.fill(init_b));
            c.par_chunks_mut(chunk).for_each(|x| x.fill(init_c));
        });
        Ok(())
    }

    fn copy(&mut self) -> Result<()> {
        let Self { pool, a, c, chunk, .. } = self;
        let chunk = *chunk;
        pool.install(|| {
            c.par_chunks_mut(chunk)
                .zip(a.par_chunks(chunk))
                .for_each(|(c, a)| c.copy_from_slice(a));
        });
        Ok(())
    }

    fn mul(&mut self) -> Result<()> {
        let Self { pool, b, c, chunk, scalar, .. } = self;
        let (chunk, scalar) = (*chunk, *scalar);
        pool.install(|| {
            b.par_chunks_mut(chunk).zip(c.par_chunks(chunk)).for_each(|(b, c)| {
                for (b, &c) in b.iter_mut().zip(c) {
                    *b = scalar * c;
                }
            });
        });
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let Self { pool, a, b, c, chunk, .. } = self;
        let chunk = *chunk;
        pool.install(|| {
            c.par_chunks_mut(chunk).zip(a.par_chunks(chunk)).zip(b.par_chunks(chunk)).for_each(
                |((c, a), b)| {
                    for ((c, &a), &b) in c.iter_mut().zip(a).zip(b) {
                        *c = a + b;
                    }
                },
            );
        });
        Ok(())
    }

    fn triad(&mut self) -> Result<()> {
        let Self { pool, a, b, c, chunk, scalar } = self;
        let (chunk, scalar) = (*chunk, *scalar);
        pool.install(|| {
            a.par_chunks_mut(chunk).zip(b.par_chunks(chunk)).zip(c.par_chunks(chunk)).for_each(
                |((a, b), c)| {
                    for ((a, &b), &c) in a.iter_mut().zip(b).zip(c) {
                        *a = b + scalar * c;
                    }
                },
            );
        });
        Ok(())
    }

    fn nstream(&mut self) -> Result<()> {
        let Self { pool, a, b, c, chunk, scalar } = self;
        let (chunk, scalar) = (*chunk, *scalar);
        pool.install(|| {
            a.par_chunks_mut(chunk).zip(b.par_chunks(chunk)).zip(c.par_chunks(chunk)).for_each(
                |((a, b), c)| {
                    for ((a, &b), &c) in a.iter_mut().zip(b).zip(c) {
                        *a = *a + (b + scalar * c);
                    }
                },
            );
        });
        Ok(())
    }

    fn dot(&mut self) -> Result<T> {
        let Self { pool, a, b, chunk, .. } = self;
        let chunk = *chunk;
        Ok(pool.install(|| {
            a.par_chunks(chunk)
                .zip(b.par_chunks(chunk))
                .map(|(a, b)| a.iter().zip(b).fold(T::zero(), |sum, (&a, &b)| sum + a * b))
                .sum()
        }))
    }

    fn get_arrays(&mut self) -> Result<ArrayView<'_, T>> {
        Ok(ArrayView { a: &self.a, b: &self.b, c: &self.c })
    }
}
