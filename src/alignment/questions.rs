use serde::{Deserialize, Serialize};
use tracing::debug;

use super::normalize::normalize;

/// Display length of `Question::short`, including the trailing ".."
pub const SHORT_MAX_CHARS: usize = 120;

/// Length cap applied to the text before it becomes `Question::searchable`
pub const SEARCHABLE_MAX_CHARS: usize = 170;

/// How far a list number may drift from the previous accepted number
pub const NUMBERING_WINDOW: i64 = 3;

/// Blocks shorter than this are never list items
const MIN_BLOCK_CHARS: usize = 10;

/// Widest whitespace-only line treated as a paragraph break
const MAX_BLANK_LINE_SPACES: usize = 10;

/// A question as listed in the episode description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub full: String,
    pub searchable: String,
    #[serde(rename = "shortent", alias = "short")]
    pub short: String,
}

/// A description block that starts with a list number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestionBlock {
    pub text: String,
    pub numeral: Option<i64>,
}

impl RawQuestionBlock {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            numeral: leading_numeral(text),
        }
    }
}

/// Parse the run of ASCII digits at the start of `text`
pub fn leading_numeral(text: &str) -> Option<i64> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn starts_with_list_digit(text: &str) -> bool {
    matches!(text.chars().next(), Some('1'..='9'))
}

/// Normalize separator lines and split the description into paragraphs
fn split_paragraphs(description: &str) -> Vec<String> {
    let mut text = description.to_string();
    for width in 1..=MAX_BLANK_LINE_SPACES {
        let blank = format!("\n{}\n", " ".repeat(width));
        text = text.replace(&blank, "\n\n");
    }
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }

    text.split("\n\n").map(|part| part.trim().to_string()).collect()
}

/// Find the description blocks that look like numbered list items
pub fn find_numbered_blocks(description: &str) -> Vec<RawQuestionBlock> {
    let mut blocks = Vec::new();

    for part in split_paragraphs(description) {
        if part.chars().count() < MIN_BLOCK_CHARS {
            continue;
        }

        if starts_with_list_digit(&part) {
            blocks.push(RawQuestionBlock::new(&part));
            continue;
        }

        // a heading line directly above the list
        if let Some((_, rest)) = part.split_once('\n') {
            if starts_with_list_digit(rest) {
                blocks.push(RawQuestionBlock::new(rest));
            }
        }
    }

    blocks
}

/// Keep the blocks whose numbering follows on from the previous accepted one.
///
/// Tolerates small glitches (repeated or skipped numbers) while rejecting
/// unrelated numbered text such as timestamps or sponsor lists.
pub fn filter_plausible_numbering(blocks: Vec<RawQuestionBlock>) -> Vec<RawQuestionBlock> {
    let mut running_min: i64 = 0;
    let mut accepted = Vec::new();

    for block in blocks {
        let Some(numeral) = block.numeral else {
            continue;
        };
        if numeral < running_min - NUMBERING_WINDOW || numeral > running_min + NUMBERING_WINDOW {
            debug!("Skipping block numbered {} (expected near {})", numeral, running_min);
            continue;
        }
        running_min = numeral;
        accepted.push(block);
    }

    accepted
}

/// Extract the raw question candidates from a description, in listed order
pub fn extract_candidates(description: &str) -> Vec<String> {
    filter_plausible_numbering(find_numbered_blocks(description))
        .into_iter()
        .map(|block| block.text)
        .collect()
}

fn is_numbering_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ':' | '=' | '(' | ')' | ' ')
}

/// Remove the list numbering in front of the question text
fn strip_numbering(text: &str) -> &str {
    match text.char_indices().find(|(_, c)| !is_numbering_char(*c)) {
        Some((idx, _)) => &text[idx..],
        // nothing but numbering characters: left as is
        None => text,
    }
}

/// Remove the first `( ... )` aside, only when it is closed
fn remove_first_parenthetical(text: &str) -> String {
    if let Some(open) = text.find('(') {
        if let Some(close) = text[open..].find(')') {
            let after = &text[open + close + 1..];
            return format!("{} {}", &text[..open], after);
        }
    }
    text.to_string()
}

fn truncate_chars(text: &str, max: usize) -> Option<&str> {
    text.char_indices().nth(max).map(|(idx, _)| &text[..idx])
}

/// Derive the display and lookup forms of one raw question block
pub fn format_question(raw: &str) -> Question {
    let lines: Vec<&str> = raw.split('\n').collect();
    let mut base = lines[0].to_string();
    if lines.len() >= 3 {
        base.push(' ');
        base.push_str(lines[1]);
    }

    let full = strip_numbering(&base).to_string();

    let short = match truncate_chars(&full, SHORT_MAX_CHARS - 2) {
        Some(head) if full.chars().count() > SHORT_MAX_CHARS => format!("{}..", head),
        _ => full.clone(),
    };

    let (capped, truncated) = match truncate_chars(&full, SEARCHABLE_MAX_CHARS) {
        Some(head) => (head, true),
        None => (full.as_str(), false),
    };

    let mut searchable = normalize(&remove_first_parenthetical(capped));
    if truncated {
        // the cap most likely cut the last word in half
        if let Some((head, _)) = searchable.rsplit_once(' ') {
            searchable = head.to_string();
        }
    }

    Question {
        full,
        searchable,
        short,
    }
}

/// Extract and format every question listed in a description
pub fn detect_questions(description: &str) -> Vec<Question> {
    extract_candidates(description)
        .iter()
        .map(|raw| format_question(raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numerals(blocks: &[RawQuestionBlock]) -> Vec<i64> {
        blocks.iter().filter_map(|b| b.numeral).collect()
    }

    #[test]
    fn test_leading_numeral() {
        assert_eq!(leading_numeral("12. Question"), Some(12));
        assert_eq!(leading_numeral("3a) Question"), Some(3));
        assert_eq!(leading_numeral("Question 3"), None);
        assert_eq!(leading_numeral(""), None);
    }

    #[test]
    fn test_plausibility_filter_drops_outlier() {
        let blocks = ["1. one", "2. two", "3. three", "50. fifty", "4. four"]
            .iter()
            .map(|t| RawQuestionBlock::new(t))
            .collect();
        let accepted = filter_plausible_numbering(blocks);
        assert_eq!(numerals(&accepted), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_plausibility_filter_rejects_missing_numeral() {
        let blocks = vec![
            RawQuestionBlock::new("1. first"),
            RawQuestionBlock { text: "no number".into(), numeral: None },
            RawQuestionBlock::new("1. repeated"),
            RawQuestionBlock::new("5. skipped ahead"),
        ];
        let accepted = filter_plausible_numbering(blocks);
        assert_eq!(numerals(&accepted), vec![1, 1]);
    }

    #[test]
    fn test_first_number_must_be_small() {
        let blocks = vec![RawQuestionBlock::new("7. too far"), RawQuestionBlock::new("2. fine")];
        assert_eq!(numerals(&filter_plausible_numbering(blocks)), vec![2]);
    }

    #[test]
    fn test_extract_candidates_from_description() {
        let description = "Welcome to the show!\n\nQuestions this week:\n1. How do I stay motivated?\n  \n2. What is the best way to learn?\n\n\n\n3. Short\n\nFollow us at 2020 places online\n\n4. Why do people procrastinate so much?";
        let candidates = extract_candidates(description);
        assert_eq!(
            candidates,
            vec![
                "1. How do I stay motivated?",
                "2. What is the best way to learn?",
                "4. Why do people procrastinate so much?",
            ]
        );
    }

    #[test]
    fn test_extract_candidates_empty_description() {
        assert!(extract_candidates("").is_empty());
        assert!(extract_candidates("Just some text\n\nwithout any list").is_empty());
    }

    #[test]
    fn test_format_strips_numbering() {
        let question = format_question("12.) How do I deal with stress?");
        assert_eq!(question.full, "How do I deal with stress?");
        assert_eq!(question.short, "How do I deal with stress?");
        assert_eq!(question.searchable, "how deal with stress");
    }

    #[test]
    fn test_format_two_line_continuation() {
        let question = format_question("1. How do I\nfind a partner\n2. next");
        assert_eq!(question.full, "How do I find a partner");

        // two lines only: second line ignored
        let question = format_question("1. How do I\nfind a partner");
        assert_eq!(question.full, "How do I");
    }

    #[test]
    fn test_format_removes_first_parenthetical_only() {
        let question = format_question("1. Dating (asked by Sam) advice (part two)");
        assert_eq!(question.full, "Dating (asked by Sam) advice (part two)");
        assert_eq!(question.searchable, "dating advice part two");
    }

    #[test]
    fn test_format_unbalanced_parenthesis_kept() {
        let question = format_question("1. Dating (asked by Sam advice");
        assert_eq!(question.searchable, "dating asked by sam advice");
    }

    #[test]
    fn test_format_short_truncation() {
        let raw = format!("1. {}", "a".repeat(130));
        let question = format_question(&raw);
        assert_eq!(question.short.chars().count(), SHORT_MAX_CHARS);
        assert!(question.short.ends_with(".."));

        let exact = format!("1. {}", "b".repeat(SHORT_MAX_CHARS));
        assert_eq!(format_question(&exact).short, "b".repeat(SHORT_MAX_CHARS));
    }

    #[test]
    fn test_format_searchable_cap_drops_last_word() {
        let words: Vec<String> = (0..40).map(|i| format!("word{}", i)).collect();
        let raw = format!("1. {}", words.join(" "));
        let question = format_question(&raw);

        let capped: String = question.full.chars().take(SEARCHABLE_MAX_CHARS).collect();
        let mut expected: Vec<&str> = capped.split(' ').collect();
        expected.pop();
        assert_eq!(question.searchable, expected.join(" "));
    }

    #[test]
    fn test_detect_questions_order() {
        let questions = detect_questions("1. First question here\n\n2. Second question here");
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].full, "First question here");
        assert_eq!(questions[1].searchable, "second question here");
    }

    #[test]
    fn test_question_json_field_names() {
        let question = format_question("1. What about cats?");
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["shortent"], "What about cats?");
        assert_eq!(json["searchable"], "what about cats");
    }
}
