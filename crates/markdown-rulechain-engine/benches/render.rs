use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use markdown_rulechain_engine::{Markdown, OptionsUpdate};

fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and `code`.\n\n- Bullet point\n  - Nested item\n- Another [link](https://example.com)\n\n> quoted\n> text\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);

    let md = Markdown::new();
    for size in [1, 10, 100] {
        let content = generate_markdown_content(size);
        group.bench_with_input(BenchmarkId::new("default", size), &content, |b, content| {
            b.iter(|| md.render(std::hint::black_box(content)).unwrap());
        });
    }

    let typographer = Markdown::with_options(OptionsUpdate {
        linkify: Some(true),
        typographer: Some(true),
        ..Default::default()
    });
    let content = generate_markdown_content(100);
    group.bench_function("linkify_typographer", |b| {
        b.iter(|| typographer.render(std::hint::black_box(&content)).unwrap());
    });

    group.finish();
}

fn bench_emphasis_runs(c: &mut Criterion) {
    let md = Markdown::new();
    let content = "*a _b ".repeat(2_000);
    c.bench_function("unbalanced_delimiters", |b| {
        b.iter(|| md.render(std::hint::black_box(&content)).unwrap());
    });
}

criterion_group!(benches, bench_render, bench_emphasis_runs);
criterion_main!(benches);
