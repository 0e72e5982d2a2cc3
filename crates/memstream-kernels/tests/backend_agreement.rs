//! Every compiled backend computes the same arrays as the serial one.

use memstream_common::{BENCHMARKS, BenchId, Selection};
use memstream_kernels::{KernelBackend, StreamKernels, compiled_backends, make_stream};
use proptest::prelude::*;

fn step(stream: &mut dyn StreamKernels<f64>, id: BenchId) -> f64 {
    match id {
        BenchId::Copy => stream.copy().map(|_| 0.0),
        BenchId::Mul => stream.mul().map(|_| 0.0),
        BenchId::Add => stream.add().map(|_| 0.0),
        BenchId::Triad => stream.triad().map(|_| 0.0),
        BenchId::Nstream => stream.nstream().map(|_| 0.0),
        BenchId::Dot => stream.dot(),
    }
    .unwrap()
}

fn any_kernel() -> impl Strategy<Value = BenchId> {
    prop::sample::select(BENCHMARKS.iter().map(|b| b.id).collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn backends_agree_on_any_kernel_sequence(
        n in 1usize..5000,
        seq in prop::collection::vec(any_kernel(), 1..12),
    ) {
        let mut reference =
            make_stream::<f64>(KernelBackend::Serial, Selection::All, n, 0, 0.1, 0.2, 0.0).unwrap();
        let expected_sums: Vec<f64> = seq.iter().map(|&id| step(reference.as_mut(), id)).collect();
        let expected = reference.get_arrays().unwrap();
        let (ea, eb, ec) = (expected.a.to_vec(), expected.b.to_vec(), expected.c.to_vec());

        for backend in compiled_backends() {
            let mut stream =
                make_stream::<f64>(backend, Selection::All, n, 0, 0.1, 0.2, 0.0).unwrap();
            let sums: Vec<f64> = seq.iter().map(|&id| step(stream.as_mut(), id)).collect();
            let view = stream.get_arrays().unwrap();
            prop_assert_eq!(view.a, &ea[..]);
            prop_assert_eq!(view.b, &eb[..]);
            prop_assert_eq!(view.c, &ec[..]);
            for (got, want) in sums.iter().zip(&expected_sums) {
                let tol = want.abs().max(1.0) * 1e-9;
                prop_assert!((got - want).abs() <= tol, "{} dot {} vs {}", backend, got, want);
            }
        }
    }
}
