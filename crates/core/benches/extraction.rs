use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pagedown_core::{Document, ExtractConfig, absolutize_urls, classify_document, extract_content};
use url::Url;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("../../tests/fixtures/{name}")).unwrap()
}

/// An article padded with `sections` extra sections and link lists.
fn synthetic_page(sections: usize) -> String {
    let mut html = String::from("<html><head><title>Bench</title></head><body><nav>");
    for i in 0..sections {
        html.push_str(&format!(r#"<a href="/nav/{i}">Link {i}</a>"#));
    }
    html.push_str("</nav><article>");
    for i in 0..sections {
        html.push_str(&format!(
            r#"<h2>Section {i}</h2><p>Paragraph {i} talks about parsing, ownership and the cost of copying data
            between buffers. See <a href="notes/{i}.html">the notes</a> for details.</p><img src="img/{i}.png">"#
        ));
    }
    html.push_str("</article></body></html>");
    html
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    for sections in [10, 100, 1000] {
        let doc = Document::parse(&synthetic_page(sections));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &doc, |b, doc| {
            b.iter(|| classify_document(black_box(doc)))
        });
    }

    group.finish();
}

fn bench_absolutize(c: &mut Criterion) {
    let html = synthetic_page(100);
    let base = Url::parse("https://example.com/posts/bench").unwrap();

    c.bench_function("absolutize_urls", |b| b.iter(|| absolutize_urls(black_box(&html), &base)));
}

fn bench_extract(c: &mut Criterion) {
    let article = Document::parse(&fixture("article.html"));
    let synthetic = Document::parse(&synthetic_page(100));
    let config = ExtractConfig::default();

    let mut group = c.benchmark_group("extract");
    group.bench_function("fixture", |b| b.iter(|| extract_content(black_box(&article), &config)));
    group.bench_function("synthetic", |b| b.iter(|| extract_content(black_box(&synthetic), &config)));
    group.finish();
}

criterion_group!(benches, bench_classify, bench_absolutize, bench_extract);
criterion_main!(benches);
