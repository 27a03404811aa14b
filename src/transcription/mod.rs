//! Subtitle input for the alignment engine

pub mod cues;

pub use cues::{parse_cues, Cue};

use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// One caption text line with the start time of its cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLine {
    pub start: Duration,
    pub text: String,
}

/// Flatten cues into caption lines, every line keeping its cue start time
pub fn caption_lines(cues: &[Cue]) -> Vec<CaptionLine> {
    cues.iter()
        .flat_map(|cue| {
            cue.lines
                .iter()
                .filter(|text| !text.is_empty())
                .map(move |text| CaptionLine {
                    start: cue.start,
                    text: text.clone(),
                })
        })
        .collect()
}

/// Read and parse a subtitle file into caption lines
pub async fn read_caption_lines(path: &Path) -> Result<Vec<CaptionLine>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AnalysisError::unavailable(path, e))?;

    let cues = parse_cues(&content)?;
    let lines = caption_lines(&cues);
    debug!("📜 Read {} cues, {} caption lines from {}", cues.len(), lines.len(), path.display());
    Ok(lines)
}
