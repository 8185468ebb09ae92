use chunkflow_engine::segmenting::{check_against_text, segment, separator_spans};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
mod common;

fn bench_segmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("segmentation");

    for count in [10, 100, 1000] {
        let text = common::generate_paragraphs(count);

        group.bench_with_input(BenchmarkId::new("segment", count), &text, |b, text| {
            b.iter(|| std::hint::black_box(segment(std::hint::black_box(text))));
        });

        group.bench_with_input(BenchmarkId::new("separator_spans", count), &text, |b, text| {
            b.iter(|| std::hint::black_box(separator_spans(std::hint::black_box(text))));
        });

        let segments = segment(&text);
        group.bench_with_input(BenchmarkId::new("validate", count), &text, |b, text| {
            b.iter(|| std::hint::black_box(check_against_text(&segments, text)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_segmentation);
criterion_main!(benches);
