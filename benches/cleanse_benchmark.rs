use criterion::{black_box, criterion_group, criterion_main, Criterion};
use text_cleanser::{cleanse, DictionarySubstitutor, Pipeline, SlangDictionary, Table};

fn generate_sample_text(words: usize) -> String {
    let vocabulary = ["gue", "gak", "ngerti!!", "bgt", "@user", "2024", "lu", "mantap", "  "];
    (0..words)
        .map(|i| vocabulary[i % vocabulary.len()])
        .collect::<Vec<&str>>()
        .join(" ")
}

fn generate_dictionary(entries: usize) -> SlangDictionary {
    let mut pairs: Vec<(String, String)> = vec![
        ("gue".to_string(), "saya".to_string()),
        ("gak".to_string(), "tidak".to_string()),
        ("bgt".to_string(), "banget".to_string()),
        ("lu".to_string(), "kamu".to_string()),
    ];
    pairs.extend((0..entries).map(|i| (format!("slang{}", i), format!("formal{}", i))));
    SlangDictionary::from_pairs(pairs)
}

fn generate_sample_csv(rows: usize) -> String {
    let mut csv = String::from("Tweet,HS,Abusive\n");
    for i in 0..rows {
        csv.push_str(&format!("\"{}\",{},{}\n", generate_sample_text(20), i % 2, i % 3));
    }
    csv
}

fn bench_cleanse(c: &mut Criterion) {
    let text = generate_sample_text(100);

    c.bench_function("cleanse 100 words", |b| {
        b.iter(|| cleanse(black_box(&text)))
    });

    // Benchmark with different text lengths
    let word_counts = [10, 100, 1000, 10000];
    let mut group = c.benchmark_group("cleanse_scaling");
    for &count in &word_counts {
        let text = generate_sample_text(count);
        group.bench_function(format!("{} words", count), |b| {
            b.iter(|| cleanse(black_box(&text)))
        });
    }
    group.finish();
}

fn bench_substitute(c: &mut Criterion) {
    let text = cleanse(&generate_sample_text(100));

    let entry_counts = [10, 100, 1000];
    let mut group = c.benchmark_group("substitute_scaling");
    for &count in &entry_counts {
        let substitutor = DictionarySubstitutor::new(&generate_dictionary(count)).unwrap();
        group.bench_function(format!("{} entries", count), |b| {
            b.iter(|| substitutor.substitute(black_box(&text)))
        });
    }
    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let csv = generate_sample_csv(1000);
    let pipeline = Pipeline::default();

    c.bench_function("clean 1000 row table", |b| {
        b.iter(|| {
            let mut table = Table::from_csv("bench", black_box(&csv)).unwrap();
            table.clean(&pipeline)
        })
    });
}

criterion_group!(benches, bench_cleanse, bench_substitute, bench_table);
criterion_main!(benches);
