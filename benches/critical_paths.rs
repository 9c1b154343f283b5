//! Criterion benchmarks for multicss critical paths
//!
//! Benchmarks the per-file operations that run for every discovered file:
//! - Selection: extension and include/exclude checks
//! - Tokens: path token encoding and decoding
//! - Processing: the built-in plugin chain over a stylesheet

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use multicss::build::{destination_path, flatten, InputFile, PathToken, Selection};
use multicss::filter::{FileFilter, FileFilterList};
use multicss::process::plugins::{Minify, SelectorMetadata};
use multicss::process::{ProcessOptions, Processor};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate `n` relative paths with a mix of extensions
fn make_paths(n: usize) -> Vec<String> {
    let extensions = ["css", "pcss", "min.css", "map", "txt"];
    (0..n)
        .map(|i| format!("components/group{}/file{}.{}", i % 8, i, extensions[i % extensions.len()]))
        .collect()
}

/// Generate a stylesheet with `n` rules
fn make_stylesheet(n: usize) -> String {
    (0..n)
        .map(|i| format!(".rule-{} > .child:hover {{ color: #{:06x}; margin: {}px; }}\n", i, i * 997, i % 17))
        .collect()
}

fn make_selection() -> Selection {
    let exclude: FileFilterList = vec![FileFilter::pattern(r"\.min\.css$").unwrap()].into();
    Selection::new(vec!["css".to_string(), "pcss".to_string()], None, Some(exclude))
}

// =============================================================================
// Selection Benchmarks
// =============================================================================

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let selection = make_selection();

    for size in [100, 1_000, 10_000].iter() {
        let paths = make_paths(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("should_process_file", size), &paths, |b, paths| {
            b.iter(|| paths.iter().filter(|p| selection.should_process_file(black_box(p))).count())
        });
    }

    let lists: Vec<Vec<String>> = (0..16).map(|_| make_paths(256)).collect();
    group.bench_function("flatten_16x256", |b| b.iter(|| flatten(black_box(lists.clone()))));

    group.finish();
}

// =============================================================================
// Token Benchmarks
// =============================================================================

fn bench_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokens");
    let file = InputFile::new(
        "/home/user/project/src/components/button/button.css",
        "/home/user/project/src",
        "components/button/button.css",
    );
    let token = PathToken::encode(&file);

    group.bench_function("encode", |b| b.iter(|| PathToken::encode(black_box(&file))));
    group.bench_function("decode", |b| b.iter(|| black_box(&token).decode()));
    group.bench_function("destination_path", |b| {
        b.iter(|| destination_path(black_box("components/button/button.pcss"), Some("css")))
    });

    group.finish();
}

// =============================================================================
// Processing Benchmarks
// =============================================================================

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    let processor =
        Processor::new(vec![Box::new(Minify), Box::new(SelectorMetadata::default())]);

    for size in [10, 100, 1_000].iter() {
        let css = make_stylesheet(*size);
        group.throughput(Throughput::Bytes(css.len() as u64));
        group.bench_with_input(BenchmarkId::new("minify_and_metadata", size), &css, |b, css| {
            b.iter(|| processor.process(black_box(css), ProcessOptions::new("bench.css", "bench.css")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_selection, bench_tokens, bench_process);
criterion_main!(benches);
