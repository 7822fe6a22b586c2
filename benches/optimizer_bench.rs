//! Benchmarks do otimizador.
//!
//! Testa performance de:
//! - Contagem de tokens
//! - Limpeza de texto
//! - Extração de seções (texto plano e markdown)
//! - Chunking
//! - Estratégias completas e batch paralelo
//!
//! Executar: `cargo bench --bench optimizer_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use paper_optimizer::cleaner::TextCleaner;
use paper_optimizer::optimizer::{OptimizeOptions, Optimizer, Strategy};
use paper_optimizer::sections::{extract_markdown, extract_plain};
use paper_optimizer::tokens::TokenAccountant;
use paper_optimizer::types::Document;
use paper_optimizer::utils::{chunk_text, ChunkOptions};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HELPERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn paragraph(i: usize) -> String {
    format!(
        "Experiment {} shows that sparse attention keeps {}% of the accuracy while using fewer heads. \
         The effect holds across model sizes and datasets.",
        i,
        90 + i % 10
    )
}

fn plain_paper(paragraphs_per_section: usize) -> String {
    let body = |offset: usize| {
        (0..paragraphs_per_section)
            .map(|i| paragraph(offset + i))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    let references = (1..=200)
        .map(|i| format!("[{}] Author {}. Paper title {}. Venue, 2021.", i, i, i))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "ABSTRACT\n{}\n\n1. INTRODUCTION\n{}\n\n2. METHODOLOGY\n{}\n\n3. RESULTS\n{}\n\n4. CONCLUSION\n{}\n\nREFERENCES\n{}",
        paragraph(0),
        body(10),
        body(20),
        body(30),
        paragraph(40),
        references
    )
}

fn markdown_paper(paragraphs_per_section: usize) -> String {
    let body = (0..paragraphs_per_section)
        .map(paragraph)
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "# Sparse Attention\n\n## Abstract\n{}\n\n## 1. Introduction\n{}\n\n## 2. Methods\n{}\n\n### 2.1 Setup\n{}\n\n## 3. Results\n{}\n\n## 4. Conclusion\n{}",
        paragraph(0),
        body,
        body,
        paragraph(1),
        body,
        paragraph(2)
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Tokens
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_count_tokens(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_tokens");
    let accountant = TokenAccountant::default();

    for size in [10, 100, 500] {
        let text = plain_paper(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |bencher, text| {
            bencher.iter(|| black_box(accountant.count_tokens(text)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Limpeza e Seções
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_clean(c: &mut Criterion) {
    let cleaner = TextCleaner::default();
    let text = plain_paper(100);

    c.bench_function("clean_plain_paper", |bencher| {
        bencher.iter(|| black_box(cleaner.clean(&text)))
    });
}

fn bench_extract_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_sections");
    let plain = TextCleaner::default().clean(&plain_paper(100));
    let markdown = markdown_paper(100);

    group.bench_function("plain", |bencher| {
        bencher.iter(|| black_box(extract_plain(&plain)))
    });
    group.bench_function("markdown", |bencher| {
        bencher.iter(|| black_box(extract_markdown(&markdown)))
    });

    group.finish();
}

fn bench_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_text");
    let text = plain_paper(500);
    group.throughput(Throughput::Bytes(text.len() as u64));

    for max_chars in [2_000, 12_000] {
        let options = ChunkOptions::new(max_chars, 200);
        group.bench_with_input(BenchmarkId::from_parameter(max_chars), &options, |bencher, options| {
            bencher.iter(|| black_box(chunk_text(&text, options)))
        });
    }

    group.finish();
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BENCHMARK: Estratégias
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let optimizer = Optimizer::new();
    let document = Document::plain(plain_paper(200));

    for strategy in [Strategy::Truncate, Strategy::Sections, Strategy::Smart, Strategy::Chunk] {
        let options = OptimizeOptions::new(strategy, 2000);
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy),
            &options,
            |bencher, options| bencher.iter(|| black_box(optimizer.optimize(&document, options))),
        );
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let optimizer = Optimizer::new();
    let documents: Vec<Document> = (0..16)
        .map(|i| {
            if i % 2 == 0 {
                Document::plain(plain_paper(50))
            } else {
                Document::markdown(markdown_paper(50))
            }
        })
        .collect();
    let options = OptimizeOptions::new(Strategy::Sections, 2000);

    c.bench_function("optimize_batch_16", |bencher| {
        bencher.iter(|| black_box(optimizer.optimize_batch(&documents, &options)))
    });
}

criterion_group!(
    benches,
    bench_count_tokens,
    bench_clean,
    bench_extract_sections,
    bench_chunk,
    bench_strategies,
    bench_batch,
);
criterion_main!(benches);
