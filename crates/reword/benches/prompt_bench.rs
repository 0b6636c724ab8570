use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use reword::display::{MAX_DIFF_LINES, truncate_diff};
use reword::generate::{build_prompt, clean_message, extract_content};
use reword::settings::MessageStyle;

/// A unified diff touching `files` files with 40 changed lines each
fn sample_diff(files: usize) -> String {
    let mut diff = String::new();
    for f in 0..files {
        diff.push_str(&format!(
            "diff --git a/src/module_{f}.rs b/src/module_{f}.rs\n--- a/src/module_{f}.rs\n+++ b/src/module_{f}.rs\n@@ -1,20 +1,20 @@\n"
        ));
        for line in 0..20 {
            diff.push_str(&format!("-    let value_{line} = old_call({line});\n"));
            diff.push_str(&format!("+    let value_{line} = new_call({line}, &context);\n"));
        }
    }
    diff
}

fn prompt_benchmarks(c: &mut Criterion) {
    let diff = sample_diff(10);
    let mut group = c.benchmark_group("prompt");

    group.bench_function("build_descriptive", |b| {
        b.iter(|| build_prompt(&diff, "fix", None, MessageStyle::Descriptive))
    });

    group.bench_function("build_conventional_with_rationale", |b| {
        b.iter(|| {
            build_prompt(
                &diff,
                "fix",
                Some("stop the parser overflowing"),
                MessageStyle::Conventional,
            )
        })
    });

    group.finish();
}

fn response_benchmarks(c: &mut Criterion) {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"\"Fix overflow in tokenizer\n\nThe tokenizer now checks bounds before reading ahead.\""}}]}"#;
    let mut group = c.benchmark_group("response");

    group.bench_function("extract_content", |b| {
        b.iter(|| extract_content(body).expect("valid body"))
    });

    group.bench_function("clean_message", |b| {
        let raw = extract_content(body).expect("valid body");
        b.iter(|| clean_message(&raw, true))
    });

    group.finish();
}

fn scaling_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for files in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("truncate_diff", files), files, |b, &files| {
            let diff = sample_diff(files);
            b.iter(|| truncate_diff(&diff, MAX_DIFF_LINES))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    prompt_benchmarks,
    response_benchmarks,
    scaling_benchmarks
);
criterion_main!(benches);
