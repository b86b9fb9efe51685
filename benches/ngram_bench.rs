// In benches/ngram_bench.rs

use std::sync::Arc;

use arrow::array::{ArrayRef, ListBuilder, RecordBatch, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ngram_transform::{extract, BatchTransform, NGramConfig, NGramSize, NGramTransform};

// --- MOCK DATA GENERATION ---

/// Generates a token sequence cycling through a small vocabulary.
fn generate_tokens(len: usize) -> Vec<String> {
    let vocabulary = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];
    (0..len)
        .map(|i| vocabulary[i % vocabulary.len()].to_string())
        .collect()
}

/// Builds a batch of `rows` records, each holding `tokens_per_row` tokens.
fn generate_batch(rows: usize, tokens_per_row: usize) -> RecordBatch {
    let tokens = generate_tokens(tokens_per_row);
    let mut builder = ListBuilder::new(StringBuilder::new());
    for _ in 0..rows {
        for token in &tokens {
            builder.values().append_value(token);
        }
        builder.append(true);
    }
    let column: ArrayRef = Arc::new(builder.finish());
    let schema = Arc::new(Schema::new(vec![Field::new(
        "tokens",
        DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
        true,
    )]));
    RecordBatch::try_new(schema, vec![column]).unwrap()
}

// --- Benchmark Suite ---

const BENCH_TOKENS: usize = 4096;
const BENCH_ROWS: usize = 1024;
const BENCH_TOKENS_PER_ROW: usize = 64;

fn bench_extract(c: &mut Criterion) {
    let tokens = generate_tokens(BENCH_TOKENS);

    let mut group = c.benchmark_group("NGram Kernel");
    group.throughput(criterion::Throughput::Elements(BENCH_TOKENS as u64));

    for n in [1usize, 2, 3, 5] {
        group.bench_function(format!("extract n={}", n), |b| {
            b.iter(|| black_box(extract(black_box(tokens.as_slice()), n)))
        });
    }
    group.finish();
}

fn bench_transform_batch(c: &mut Criterion) {
    let batch = generate_batch(BENCH_ROWS, BENCH_TOKENS_PER_ROW);
    let stage = NGramTransform::new(NGramConfig::new("tokens", NGramSize::Resolved(3), "ngrams"));

    let mut group = c.benchmark_group("NGram Stage");
    group.throughput(criterion::Throughput::Elements(BENCH_ROWS as u64));
    group.bench_function("transform batch n=3", |b| {
        b.iter(|| black_box(stage.transform(black_box(&batch))))
    });
    group.finish();
}

criterion_group!(benches, bench_extract, bench_transform_batch);
criterion_main!(benches);
