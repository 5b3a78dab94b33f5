//! Benchmarks for the pure-CPU pipeline stages: segment merging and
//! style transformation.

use cantosub::merge::merge_segments;
use cantosub::segment::{SpeechSegment, TimeSpan, VoiceInterval};
use cantosub::style::{EnglishHandling, NumeralFormat, Register, StyleEngine, StyleOptions};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn make_inputs(n: usize) -> (Vec<SpeechSegment>, Vec<VoiceInterval>) {
    let speech = (0..n)
        .map(|i| {
            let start = i as f64 * 4.0;
            SpeechSegment::new(
                TimeSpan::new(start + 0.3, start + 3.7).expect("valid span"),
                "我哋今日去食lunch啦",
            )
        })
        .collect();
    let voice = (0..n)
        .map(|i| {
            let start = i as f64 * 4.0;
            VoiceInterval::new(TimeSpan::new(start + 0.2, start + 3.8).expect("valid span"))
        })
        .collect();
    (speech, voice)
}

fn bench_merge(c: &mut Criterion) {
    let (speech, voice) = make_inputs(500);
    c.bench_function("merge_500_segments", |b| {
        b.iter(|| merge_segments(black_box(&speech), black_box(&voice), 0.8))
    });
}

fn bench_style(c: &mut Criterion) {
    let options = StyleOptions {
        register: Register::Formal,
        english: EnglishHandling::Translate,
        numerals: NumeralFormat::ChineseLowercase,
    };
    c.bench_function("style_transform", |b| {
        let mut engine = StyleEngine::new();
        b.iter(|| engine.transform(black_box("我哋今日去食lunch啦，等25分鐘"), &options))
    });
}

criterion_group!(benches, bench_merge, bench_style);
criterion_main!(benches);
