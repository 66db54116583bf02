use criterion::{black_box, criterion_group, criterion_main, Criterion};
use siebwerk::fingerprint::fingerprint;
use siebwerk::normalize::{normalize, NormalizeOptions};

const PARAGRAPH: &str = "Die Demokrat*innen stimmten am Dienstag zu. Der EU-Beitritt bleibt \
laut Dr. Maier offen, siehe www.example.at für Details. Das Budget umfasst 12 Milliarden € \
und wurde mit „großer Mehrheit“ beschlossen.";

fn bench_normalize(c: &mut Criterion) {
    let corpus_opts = NormalizeOptions::corpus_defaults();
    let number_opts = NormalizeOptions {
        replace_numbers: true,
        ..NormalizeOptions::corpus_defaults()
    };

    c.bench_function("normalize_corpus_defaults", |b| {
        b.iter(|| normalize(black_box(PARAGRAPH), &corpus_opts))
    });

    c.bench_function("normalize_with_number_words", |b| {
        b.iter(|| normalize(black_box(PARAGRAPH), &number_opts))
    });

    let canonical = normalize(PARAGRAPH, &corpus_opts);
    c.bench_function("fingerprint", |b| {
        b.iter(|| fingerprint(black_box(&canonical)))
    });
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
