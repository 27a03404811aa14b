use aka_timestamps::alignment::{align, detect_questions, index_transcript};
use aka_timestamps::{align_episode, normalize, CaptionLine};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Duration;

const PHRASES: [&str; 6] = [
    "okay the next question comes from someone who has listened since the first episode",
    "how do you decide which listener questions make it onto the show each week",
    "I was honestly surprised by how many people asked about the last episode",
    "let's talk about what a typical recording day looks like behind the scenes",
    "you know when we started I had no idea anyone would send in questions",
    "alright moving on the next one is about favourite books and recommendations",
];

/// One caption line every two seconds, roughly an hour of speech
fn captions(count: usize) -> Vec<CaptionLine> {
    (0..count)
        .map(|i| CaptionLine {
            start: Duration::from_secs(i as u64 * 2),
            text: format!("{} {}", PHRASES[i % PHRASES.len()], i),
        })
        .collect()
}

fn description(questions: usize) -> String {
    let mut text = String::from("Thanks for watching! Questions:\n\n");
    for i in 0..questions {
        text.push_str(&format!("{}. {}?\n\n", i + 1, PHRASES[i % PHRASES.len()]));
    }
    text
}

fn bench_normalize(c: &mut Criterion) {
    let line = "How do you pick the questions for each episode (asking for a friend) - thanks!";
    c.bench_function("normalize_line", |b| b.iter(|| black_box(normalize(black_box(line)))));
}

fn bench_indexing(c: &mut Criterion) {
    let lines = captions(1800);
    c.bench_function("index_transcript_1h", |b| {
        b.iter(|| black_box(index_transcript(black_box(&lines))))
    });
}

fn bench_alignment(c: &mut Criterion) {
    let lines = captions(1800);
    let transcript = index_transcript(&lines);
    let questions = detect_questions(&description(20));

    c.bench_function("align_20_questions", |b| {
        b.iter(|| black_box(align(&transcript.index, &transcript.words, black_box(&questions))))
    });

    let text = description(20);
    c.bench_function("align_episode_end_to_end", |b| {
        b.iter(|| black_box(align_episode(black_box(&lines), black_box(&text))))
    });
}

criterion_group!(benches, bench_normalize, bench_indexing, bench_alignment);
criterion_main!(benches);
