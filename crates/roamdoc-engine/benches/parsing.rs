use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use roamdoc_engine::parse_document;
use roamdoc_engine::render::{HtmlOptions, to_html};
mod common;

fn bench_parse_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    for sections in [10, 100] {
        let content = common::generate_outline(sections);
        group.bench_with_input(
            BenchmarkId::new("outline", sections),
            &content,
            |b, content| {
                b.iter(|| {
                    let doc = parse_document(std::hint::black_box(content), "bench.org");
                    std::hint::black_box(doc.root.len());
                });
            },
        );
    }

    let list = common::generate_deep_list(500, 5);
    group.bench_function("deep_list", |b| {
        b.iter(|| std::hint::black_box(parse_document(std::hint::black_box(&list), "list.org")));
    });

    group.finish();
}

fn bench_render_html(c: &mut Criterion) {
    let doc = parse_document(&common::generate_outline(100), "bench.org");
    let options = HtmlOptions::default();
    c.bench_function("render_html", |b| {
        b.iter(|| std::hint::black_box(to_html(&doc.root, &options)));
    });
}

criterion_group!(benches, bench_parse_outline, bench_render_html);
criterion_main!(benches);
