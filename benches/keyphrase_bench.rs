use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nu_plugin_keyphrase::algo::collocation::collocations;
use nu_plugin_keyphrase::algo::extractor::{ExtractorSettings, KeyphraseExtractor};
use nu_plugin_keyphrase::algo::keyphrase::Extractor;
use nu_plugin_keyphrase::algo::stem::PhraseStemmer;
use nu_plugin_keyphrase::algo::tagger::{ControlledTagger, TaggerSettings};
use nu_plugin_keyphrase::algo::tokenizer;
use std::collections::HashSet;

const DOMAINS: [(&str, &[&str]); 6] = [
    ("Rust programming gives memory safety. The borrow checker enforces ownership rules. Memory safety without garbage collection.", &["rust", "memory-safety"]),
    ("Python data science uses pandas and numpy. Machine learning models train on data. Machine learning needs features.", &["python", "machine-learning"]),
    ("Web development with react and node. The react component renders the page. Node serves the web page.", &["javascript", "react"]),
    ("Go concurrency uses goroutines and channels. Channels pass messages between goroutines.", &["go", "concurrency"]),
    ("Database indexes speed up sql queries. The database planner picks an index for each query.", &["database", "sql"]),
    ("Cloud functions run serverless code. The cloud provider bills serverless functions per call.", &["cloud", "serverless"]),
];

/// Generate synthetic tagged documents for benchmarking
fn generate_docs(n: usize) -> Vec<(String, HashSet<String>)> {
    (0..n)
        .map(|i| {
            let (text, tags) = DOMAINS[i % DOMAINS.len()];
            let tags = tags.iter().map(|t| t.to_string()).collect();
            (format!("{text} Item {i} notes on part {}.", i % 100), tags)
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let stemmer = PhraseStemmer::new();
    let text = DOMAINS[1].0;
    c.bench_function("tokenize/single", |b| {
        b.iter(|| tokenizer::tokenize(black_box(text), &stemmer))
    });
}

fn bench_collocations(c: &mut Criterion) {
    let stemmer = PhraseStemmer::new();
    let text = generate_docs(50)
        .into_iter()
        .map(|(t, _)| t)
        .collect::<Vec<_>>()
        .join(" ");
    let tokens = tokenizer::tokenize(&text, &stemmer);

    c.bench_function("collocations/50_docs", |b| {
        b.iter(|| black_box(collocations(&tokens, 2, 5)))
    });
}

fn bench_tag_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_all");
    for size in [100, 1000] {
        let docs = generate_docs(size);
        let mut tagger = ControlledTagger::new(TaggerSettings::default()).unwrap();
        for (text, tags) in &docs {
            tagger.train(text, tags);
        }
        tagger.update_index();
        let texts: Vec<String> = docs.into_iter().map(|(t, _)| t).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &texts, |b, texts| {
            b.iter(|| {
                let mut t = tagger.clone();
                black_box(t.tag_all(texts))
            })
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut extractor = KeyphraseExtractor::new(ExtractorSettings::default()).unwrap();
    extractor.start_training();
    for (text, tags) in generate_docs(120) {
        let phrases: HashSet<String> = tags.iter().map(|t| t.replace('-', " ")).collect();
        extractor.train(&text, &phrases).unwrap();
    }
    extractor.end_training().unwrap();

    let text = DOMAINS[0].0;
    c.bench_function("extract/single", |b| {
        b.iter(|| black_box(extractor.extract(black_box(text)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_collocations,
    bench_tag_all,
    bench_extract,
);
criterion_main!(benches);
