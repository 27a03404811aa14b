use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::normalize::normalize;
use crate::transcription::CaptionLine;

/// One normalized word at a point in playback time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedWord {
    pub text: String,
    pub at: Duration,
}

/// Inverted index from token to the positions it occupies in the word sequence
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    positions: HashMap<String, Vec<usize>>,
}

impl WordIndex {
    /// Build the index with a single ordered scan, so every position list is
    /// strictly increasing.
    pub fn build(words: &[TimedWord]) -> Self {
        let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, word) in words.iter().enumerate() {
            positions.entry(word.text.clone()).or_default().push(position);
        }
        Self { positions }
    }

    /// Positions of a token, if it occurs anywhere in the transcript
    pub fn positions(&self, token: &str) -> Option<&[usize]> {
        self.positions.get(token).map(Vec::as_slice)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Insert a raw position list, used to construct synthetic indexes
    pub fn insert(&mut self, token: impl Into<String>, mut positions: Vec<usize>) {
        positions.sort_unstable();
        positions.dedup();
        self.positions.insert(token.into(), positions);
    }
}

/// Flattened transcript: ordered words plus their inverted index
#[derive(Debug, Clone, Default)]
pub struct TranscriptIndex {
    pub words: Vec<TimedWord>,
    pub index: WordIndex,
}

fn inline_tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"<(/)?(\d{1,2}:\d{1,2}:\d{1,2}(\.\d+)?|c)(/)?>").expect("valid inline tag pattern")
    })
}

/// Remove cue timing tags (`<00:01:02.345>`) and class tags (`<c>`, `</c>`)
pub fn strip_inline_tags(text: &str) -> String {
    inline_tag_regex().replace_all(text, "").into_owned()
}

/// Turn caption lines into the positional word sequence and its index.
///
/// Auto-generated captions repeat the previous line while the next one scrolls
/// in; a line whose normalized text equals the previous kept line is skipped.
pub fn index_transcript(lines: &[CaptionLine]) -> TranscriptIndex {
    let mut kept: Vec<(String, Duration)> = Vec::new();

    for line in lines {
        let text = normalize(&strip_inline_tags(&line.text));
        if text.is_empty() {
            continue;
        }
        if kept.last().map_or(false, |(previous, _)| *previous == text) {
            continue;
        }
        kept.push((text, line.start));
    }

    let words: Vec<TimedWord> = kept
        .iter()
        .flat_map(|(text, at)| {
            text.split(' ').map(move |token| TimedWord {
                text: token.to_string(),
                at: *at,
            })
        })
        .collect();

    let index = WordIndex::build(&words);
    debug!(
        "Indexed transcript: {} lines kept of {}, {} words, {} distinct tokens",
        kept.len(),
        lines.len(),
        words.len(),
        index.len()
    );

    TranscriptIndex { words, index }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(secs: u64, text: &str) -> CaptionLine {
        CaptionLine {
            start: Duration::from_secs(secs),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_strip_inline_tags() {
        let raw = "so<00:00:01.120><c> what</c><00:00:01.480><c> about</c>";
        assert_eq!(strip_inline_tags(raw), "so what about");
        assert_eq!(strip_inline_tags("<c/>plain<1:2:3>"), "plain");
        // other markup is left for the normalizer
        assert_eq!(strip_inline_tags("<b>bold</b>"), "<b>bold</b>");
    }

    #[test]
    fn test_words_inherit_line_start() {
        let transcript = index_transcript(&[line(1, "hello there"), line(4, "general kenobi")]);
        let texts: Vec<&str> = transcript.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "there", "general", "kenobi"]);
        assert_eq!(transcript.words[1].at, Duration::from_secs(1));
        assert_eq!(transcript.words[2].at, Duration::from_secs(4));
    }

    #[test]
    fn test_duplicate_and_empty_lines_skipped() {
        let transcript = index_transcript(&[
            line(0, "first line"),
            line(1, "First line!"),
            line(2, "the and of"),
            line(3, "second line"),
            line(4, "first line"),
        ]);
        let texts: Vec<&str> = transcript.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "line", "second", "line", "first", "line"]);
    }

    #[test]
    fn test_positions_strictly_increasing() {
        let transcript = index_transcript(&[
            line(0, "cats dogs cats"),
            line(1, "more cats here"),
        ]);
        assert_eq!(transcript.index.positions("cats"), Some(&[0, 2, 4][..]));
        assert_eq!(transcript.index.positions("dogs"), Some(&[1][..]));
        assert_eq!(transcript.index.positions("birds"), None);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = index_transcript(&[]);
        assert!(transcript.words.is_empty());
        assert!(transcript.index.is_empty());
    }
}
