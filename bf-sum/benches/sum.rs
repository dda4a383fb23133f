use bf_num::{BigFloat, Sign};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A regular value `1.100...0_2 * 2^exponent` at `precision` bits, distinct
/// enough in exponent across a generated list to avoid trivially cancelling.
fn make_value(sign: Sign, exponent: i64, precision: u32) -> BigFloat {
    let limbs = bf_num::bigfloat::limbs_for_precision(precision);
    let mut mantissa = vec![0u64; limbs];
    *mantissa.last_mut().unwrap() = 1 << (u64::BITS - 1) | 1 << (u64::BITS - 2);
    BigFloat::from_parts(sign, exponent, precision, mantissa)
}

fn generate_inputs(n: usize, precision: u32) -> Vec<BigFloat> {
    (0..n)
        .map(|i| {
            let sign = if i % 3 == 0 { Sign::Neg } else { Sign::Pos };
            make_value(sign, (i as i64) * 4, precision)
        })
        .collect()
}

fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum");
    for &n in &[8usize, 64, 512] {
        let inputs = generate_inputs(n, 53);
        let refs: Vec<&BigFloat> = inputs.iter().collect();
        group.bench_with_input(BenchmarkId::new("accumulator", n), &refs, |b, refs| {
            b.iter(|| black_box(bf_sum::sum(black_box(refs), 53, bf_num::RoundingMode::RNDN).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("legacy", n), &refs, |b, refs| {
            b.iter(|| black_box(bf_sum::legacy::sum_legacy(black_box(refs), 53, bf_num::RoundingMode::RNDN)));
        });
    }
    group.finish();
}

fn bench_cancellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_cancellation");
    // Pairs of nearly-opposite values force `sum_raw` through several
    // shift/jump iterations before a block resolves.
    let mut inputs = Vec::new();
    for i in 0..64 {
        inputs.push(make_value(Sign::Pos, 1000 - i, 53));
        inputs.push(make_value(Sign::Neg, 1000 - i, 53));
    }
    inputs.push(make_value(Sign::Pos, -1000, 53));
    let refs: Vec<&BigFloat> = inputs.iter().collect();
    group.bench_function("heavy_cancellation", |b| {
        b.iter(|| black_box(bf_sum::sum(black_box(&refs), 53, bf_num::RoundingMode::RNDN).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_sum, bench_cancellation);
criterion_main!(benches);
