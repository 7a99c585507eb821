//! Benchmarks for the ingestion pipeline.
//!
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use pagewise::{
    Charset, DecodedText, GridMeasurer, MemorySource, TextLoader, Viewport, detect, extract,
    paginate, search,
};

/// A few hundred chapters of mixed CJK and Latin prose.
fn sample_text() -> String {
    let mut text = String::new();
    for chapter in 1..=300 {
        text.push_str(&format!("第{chapter}章 风起\n"));
        for paragraph in 0..20 {
            text.push_str("　　山间的雾气还没有散去，他背着行囊走上了石阶。");
            text.push_str("The path climbed steadily through the pines. ");
            if paragraph % 5 == 0 {
                text.push_str("Chapter notes follow later.");
            }
            text.push('\n');
        }
    }
    text
}

fn gb18030_bytes(text: &str) -> Vec<u8> {
    let (bytes, _, _) = Charset::Gb18030.encoding().encode(text);
    bytes.into_owned()
}

fn page_viewport() -> Viewport {
    Viewport::new(360.0, 640.0, 18.0, 1.5)
}

// ============================================================================
// Decoding Benchmarks
// ============================================================================

fn bench_detect(c: &mut Criterion) {
    let utf8 = sample_text().into_bytes();
    let gb = gb18030_bytes(&sample_text());

    c.bench_function("detect_utf8", |b| b.iter(|| detect(&utf8[..8192])));
    c.bench_function("detect_gb18030", |b| b.iter(|| detect(&gb[..8192])));
}

fn bench_load(c: &mut Criterion) {
    let utf8: Arc<MemorySource> = Arc::new(MemorySource::new(sample_text().into_bytes()));
    let gb: Arc<MemorySource> = Arc::new(MemorySource::new(gb18030_bytes(&sample_text())));
    let loader = TextLoader::new();

    c.bench_function("load_utf8", |b| {
        b.iter(|| loader.load(utf8.clone(), None).unwrap());
    });
    c.bench_function("load_gb18030", |b| {
        b.iter(|| loader.load(gb.clone(), None).unwrap());
    });
}

// ============================================================================
// Layout Benchmarks
// ============================================================================

fn bench_paginate(c: &mut Criterion) {
    let text = DecodedText::new(sample_text());
    let measurer = GridMeasurer::new();

    c.bench_function("paginate_phone", |b| {
        b.iter(|| paginate(&text, page_viewport(), &measurer, None));
    });
}

fn bench_char_index(c: &mut Criterion) {
    let text = DecodedText::new(sample_text());
    let len = text.len();

    c.bench_function("char_to_byte", |b| {
        b.iter(|| {
            let mut total = 0;
            for offset in (0..len).step_by(997) {
                total += text.char_to_byte(offset);
            }
            total
        });
    });
}

// ============================================================================
// Outline and Search Benchmarks
// ============================================================================

fn bench_extract(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("extract_outline", |b| b.iter(|| extract(&text)));
}

fn bench_search(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("search_cjk", |b| b.iter(|| search(&text, "石阶")));
    c.bench_function("search_latin_folded", |b| {
        b.iter(|| search(&text, "CHAPTER NOTES"))
    });
}

criterion_group!(decoding, bench_detect, bench_load);
criterion_group!(layout, bench_paginate, bench_char_index);
criterion_group!(lookup, bench_extract, bench_search);
criterion_main!(decoding, layout, lookup);
