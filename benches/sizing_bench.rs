use criterion::{criterion_group, criterion_main, Criterion};

use certpress::sizing::{fit_font_size, HeuristicMeasurer, SizingPolicy};

// The sizer is a linear walk over at most 14 candidate sizes; these benches
// mostly guard against a measurement regression making it quadratic in the
// name length.
fn bench_fit_font_size(c: &mut Criterion) {
    let measurer = HeuristicMeasurer;
    let policy = SizingPolicy::default();
    let available = policy.available_width(600);

    for len in [4usize, 24, 60] {
        let name: String = std::iter::repeat('n').take(len).collect();
        c.bench_function(&format!("fit_font_size/{}_chars", len), |b| {
            b.iter(|| fit_font_size(&measurer, &name, available, &policy))
        });
    }
}

criterion_group!(benches, bench_fit_font_size);
criterion_main!(benches);
