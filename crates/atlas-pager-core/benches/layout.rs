use atlas_pager_core::prelude::*;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn generate_items(count: usize, min_size: u32, max_size: u32) -> Vec<LayoutItem<String>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            LayoutItem::new(format!("tex_{}", i), w, h)
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_pages");

    for count in [100, 500, 2000] {
        let items = generate_items(count, 8, 128);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("sequential", count), &items, |b, items| {
            let cfg = PackerConfig::builder().with_page_size(1024).build();
            b.iter(|| black_box(layout_pages(items.clone(), &cfg)))
        });

        // without the feature `parallel(true)` silently runs the sequential search
        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel_search", count), &items, |b, items| {
            let cfg = PackerConfig::builder()
                .with_page_size(1024)
                .parallel(true)
                .build();
            b.iter(|| black_box(layout_pages(items.clone(), &cfg)))
        });
    }

    group.finish();
}

fn bench_page_fill(c: &mut Criterion) {
    let items = generate_items(400, 4, 32);
    c.bench_function("single_page_fill", |b| {
        b.iter(|| {
            let mut page: AtlasPage<String> = AtlasPage::new(2048, 2048, (1, 1));
            for it in &items {
                page.try_place(&it.key, it.w, it.h);
            }
            black_box(page)
        })
    });
}

criterion_group!(benches, bench_layout, bench_page_fill);
criterion_main!(benches);
