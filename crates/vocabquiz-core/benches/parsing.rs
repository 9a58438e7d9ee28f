use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vocabquiz_core::parser::{parse_custom_list, parse_topic_str};
use vocabquiz_core::traits::extract_json_from_markdown;

fn bench_custom_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("custom_list");

    let small = generate_custom_list(10);
    let large = generate_custom_list(500);
    let noisy = {
        let mut s = generate_custom_list(100);
        for i in 0..100 {
            s.push_str(&format!("well-known-{i} - nổi tiếng\n\nno separator {i}\n"));
        }
        s
    };

    group.bench_function("10_lines", |b| {
        b.iter(|| parse_custom_list(black_box(&small)))
    });

    group.bench_function("500_lines", |b| {
        b.iter(|| parse_custom_list(black_box(&large)))
    });

    group.bench_function("noisy", |b| {
        b.iter(|| parse_custom_list(black_box(&noisy)))
    });

    group.finish();
}

fn bench_extract_json(c: &mut Criterion) {
    let fenced = format!("Here you go:\n\n```json\n{}\n```\n", generate_json_reply(50));
    let raw = generate_json_reply(50);

    c.bench_function("extract_json/fenced", |b| {
        b.iter(|| extract_json_from_markdown(black_box(&fenced)))
    });
    c.bench_function("extract_json/raw", |b| {
        b.iter(|| extract_json_from_markdown(black_box(&raw)))
    });
}

fn bench_topic_toml(c: &mut Criterion) {
    let mut group = c.benchmark_group("topic_toml");

    let small_toml = generate_topic_toml(10);
    let large_toml = generate_topic_toml(200);

    group.bench_function("10_pairs", |b| {
        b.iter(|| parse_topic_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_pairs", |b| {
        b.iter(|| parse_topic_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn generate_custom_list(n: usize) -> String {
    (0..n).map(|i| format!("word{i} - nghĩa {i}\n")).collect()
}

fn generate_json_reply(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            format!(r#"{{"englishWord": "word{i}", "phonetic": "/wɜːrd{i}/", "partOfSpeech": "noun"}}"#)
        })
        .collect();
    format!("[{}]", items.join(",\n"))
}

fn generate_topic_toml(n: usize) -> String {
    let mut s = String::from("[topic]\nid = \"bench\"\nname = \"Benchmark\"\n");
    for i in 0..n {
        s.push_str(&format!(
            r#"
[[pairs]]
english_word = "word{i}"
vietnamese_meaning = "nghĩa {i}"
part_of_speech = "noun"
"#
        ));
    }
    s
}

criterion_group!(benches, bench_custom_list, bench_extract_json, bench_topic_toml);
criterion_main!(benches);
