use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use text::names::standard_unremovable_texts;
use text::{LimitedSizeCacheTextRepository, TextRepository};

const DISTINCT_TEXTS: usize = 4_000;

fn make_texts(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("data-item-{i}")).collect()
}

fn bench_intern_hits(c: &mut Criterion) {
    let repo = LimitedSizeCacheTextRepository::new(1_000_000, &standard_unremovable_texts());
    let buffer = "<div class=\"box\"><span>hello</span></div>";
    c.bench_function("bench_intern_hits", |b| {
        b.iter(|| {
            black_box(repo.intern_slice(black_box(buffer), 1..4));
            black_box(repo.intern_slice(black_box(buffer), 5..10));
            black_box(repo.intern_parts(black_box(&["sp", "an"])));
        });
    });
}

fn bench_intern_misses_with_eviction(c: &mut Criterion) {
    let texts = make_texts(DISTINCT_TEXTS);
    c.bench_function("bench_intern_misses_with_eviction", |b| {
        b.iter_batched(
            || LimitedSizeCacheTextRepository::new(2_000, &standard_unremovable_texts()),
            |repo| {
                for text in &texts {
                    black_box(repo.intern(text));
                }
                repo
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_intern_hits, bench_intern_misses_with_eviction);
criterion_main!(benches);
