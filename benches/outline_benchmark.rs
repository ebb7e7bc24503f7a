//! Benchmarks for outline extraction and similarity scoring.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic layouts so no document files are needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use outliner::similarity::{OverlapBackend, SimilarityBackend, TfIdfBackend};
use outliner::{
    BBox, DocumentRecord, HeadingLevel, LayoutDump, RelatednessRanker, Section, SectionExtractor,
    SimilarityEngine, TextSpan,
};

/// Creates a layout with a heading and a few body lines per page.
fn create_test_layout(page_count: usize) -> LayoutDump {
    let mut spans = Vec::new();
    for page in 0..page_count {
        spans.push(TextSpan::new(
            format!("{}. Section heading {}", page + 1, page),
            "Helvetica-Bold",
            18.0,
            0,
            BBox::new(72.0, 72.0, 400.0, 90.0),
            page,
        ));
        for line in 0..20 {
            let y = 120.0 + line as f32 * 14.0;
            spans.push(TextSpan::new(
                "Body text for benchmark measurement of the aggregation pass",
                "Helvetica",
                10.0,
                0,
                BBox::new(72.0, y, 540.0, y + 10.0),
                page,
            ));
        }
    }
    LayoutDump::from_spans(spans)
}

/// Benchmark the outline pipeline at various sizes.
fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");
    let extractor = SectionExtractor::new();

    for page_count in [1, 10, 50].iter() {
        let layout = create_test_layout(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extractor.extract_from(black_box(&layout)));
        });
    }

    group.finish();
}

/// Benchmark the lexical similarity tiers.
fn bench_similarity(c: &mut Criterion) {
    let tfidf = TfIdfBackend::new();
    let overlap = OverlapBackend::new();
    let a = "Training Deep Neural Networks on Small Datasets";
    let b = "Neural Network Training with Limited Data";

    c.bench_function("tfidf_pair", |bench| {
        bench.iter(|| tfidf.score(black_box(a), black_box(b)));
    });

    c.bench_function("overlap_pair", |bench| {
        bench.iter(|| overlap.score(black_box(a), black_box(b)));
    });
}

/// Benchmark a text query over a synthetic corpus.
fn bench_ranking(c: &mut Criterion) {
    let corpus: Vec<DocumentRecord> = (0..20)
        .map(|d| {
            DocumentRecord::new(
                format!("doc{}.pdf", d),
                (0..25)
                    .map(|s| Section::new(format!("Topic {} of document {}", s, d), HeadingLevel::H2, s, ""))
                    .collect(),
            )
        })
        .collect();
    let ranker = RelatednessRanker::new(SimilarityEngine::lexical());

    c.bench_function("rank_text_500_sections", |b| {
        b.iter(|| ranker.rank_text(black_box("Topic overview of the document"), &corpus));
    });
}

criterion_group!(benches, bench_outline, bench_similarity, bench_ranking);
criterion_main!(benches);
