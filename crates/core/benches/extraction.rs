use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ogmeta_core::{Document, ExtractConfig, accumulate, collect_links, extract, extract_with_config, normalize_og};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{}", name)).unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for name in ["basic.html", "article.html", "media.html", "links.html"] {
        let html = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), &html, |b, html| {
            b.iter(|| extract("http://example.com/", black_box(html), None))
        });
    }

    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let events: Vec<(String, Option<String>)> = (0..200)
        .flat_map(|i| {
            [
                ("og:image".to_string(), Some(format!("/image-{}.jpg", i))),
                ("og:image:width".to_string(), Some("300".to_string())),
                ("og:image:height".to_string(), Some("200".to_string())),
            ]
        })
        .collect();

    c.bench_function("accumulate_and_normalize", |b| {
        b.iter(|| {
            let mut og = accumulate(
                "http://example.com/",
                black_box(&events).iter().map(|(property, content)| (property.as_str(), content.as_deref())),
            );
            normalize_og(&mut og);
            og
        })
    });
}

fn bench_links(c: &mut Criterion) {
    let doc = Document::parse(&fixture("links.html"));

    c.bench_function("collect_links", |b| b.iter(|| collect_links(black_box(&doc), "http://example.com/")));
}

fn bench_depth_guard(c: &mut Criterion) {
    let length = 2_000;
    let html = format!("<html><body>{}{}</body></html>", "<div>".repeat(length), "</div>".repeat(length));
    let config = ExtractConfig::default();

    c.bench_function("deeply_nested", |b| {
        b.iter(|| extract_with_config("http://example.com/", black_box(&html), None, &config))
    });
}

criterion_group!(benches, bench_extract, bench_accumulate, bench_links, bench_depth_guard);
criterion_main!(benches);
