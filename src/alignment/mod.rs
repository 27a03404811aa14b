//! Question alignment engine
//!
//! Maps each question listed in an episode description to the moment it is
//! asked, using token overlap between the question and the auto-generated
//! transcript. Everything in here is synchronous and free of I/O.

pub mod aligner;
pub mod index;
pub mod normalize;
pub mod questions;

pub use aligner::{align, format_timestamp, TimestampResult};
pub use index::{index_transcript, TimedWord, TranscriptIndex, WordIndex};
pub use normalize::normalize;
pub use questions::{detect_questions, extract_candidates, format_question, Question};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::transcription::CaptionLine;

/// Questions of one episode together with where they were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub questions: Vec<Question>,
    #[serde(rename = "timeStamp")]
    pub timestamps: Vec<TimestampResult>,
}

impl Alignment {
    /// Number of distinct questions with at least one located cluster
    pub fn located_questions(&self) -> usize {
        self.timestamps
            .iter()
            .filter(|t| t.found)
            .map(|t| t.question_index)
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Run the full alignment over already loaded inputs
pub fn align_episode(captions: &[CaptionLine], description: &str) -> Alignment {
    let transcript = index_transcript(captions);
    let questions = detect_questions(description);
    let timestamps = align(&transcript.index, &transcript.words, &questions);
    let alignment = Alignment {
        questions,
        timestamps,
    };

    info!(
        "Aligned {} questions against {} transcript words, {} located",
        alignment.questions.len(),
        transcript.words.len(),
        alignment.located_questions()
    );

    alignment
}
