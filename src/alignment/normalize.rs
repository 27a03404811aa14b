/// Words that carry no signal for locating a question in speech
pub const STOP_WORDS: [&str; 18] = [
    "i", "a", "was", "and", "it", "of", "like", "do", "to", "you", "as", "have", "when", "the",
    "because", "in", "is", "that",
];

/// Check whether a token is dropped during normalization
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Convert free text into a space separated token string.
///
/// Transcript lines and question summaries both go through this function so
/// that their tokens can be compared for plain equality.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    let mut filtered = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        match ch {
            'a'..='z' | '0'..='9' => filtered.push(ch),
            ' ' | '/' | '\t' | '\n' | '\r' | '-' | '"' | '\u{201c}' | '\u{201d}' => {
                if !filtered.ends_with(' ') {
                    filtered.push(' ');
                }
            }
            // apostrophes join contractions: can't -> cant
            _ => {}
        }
    }

    let mut kept: Vec<&str> = Vec::new();
    for token in filtered.split(' ') {
        if token.is_empty() || is_stop_word(token) {
            continue;
        }
        if kept.last() == Some(&token) {
            continue;
        }
        kept.push(token);
    }

    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
    }

    #[test]
    fn test_stop_words_only() {
        assert_eq!(normalize("the is of and"), "");
        assert_eq!(normalize("I was like, you know"), "know");
    }

    #[test]
    fn test_duplicate_collapsing() {
        assert_eq!(normalize("the word word word"), "word");
        // duplicates separated only by stop-words collapse too
        assert_eq!(normalize("word the word"), "word");
        assert_eq!(normalize("word other word"), "word other word");
    }

    #[test]
    fn test_punctuation_handling() {
        assert_eq!(normalize("Can't, really?"), "cant really");
        assert_eq!(normalize("self-esteem/anxiety"), "self esteem anxiety");
        assert_eq!(normalize("\"quoted\"words"), "quoted words");
        assert_eq!(normalize("50% (maybe) #1!"), "50 maybe 1");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("  hello    world \n again "), "hello world again");
        assert_eq!(normalize("- / -"), "");
    }

    #[test]
    fn test_non_ascii_dropped() {
        assert_eq!(normalize("café naïve"), "caf nave");
    }

    #[test]
    fn test_idempotent_examples() {
        for input in ["Can't, really?", "the word word word", "A - B / C", "What's up, Doc?"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }
}
