use std::time::Duration;

use crate::error::{AnalysisError, Result};

/// Timed subtitle cue (WebVTT or SubRip)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start timestamp
    pub start: Duration,
    /// End timestamp
    pub end: Duration,
    /// Text lines, markup untouched
    pub lines: Vec<String>,
}

/// Parse WebVTT or SRT content into cues.
///
/// Header, `NOTE`, `STYLE` and `REGION` blocks are skipped, cue identifiers and
/// cue settings are ignored.
pub fn parse_cues(content: &str) -> Result<Vec<Cue>> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();
    let mut line_no = 0;

    for block in content.split("\n\n") {
        let block_start = line_no + 1;
        line_no += block.lines().count() + 1;

        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(first) = lines.first() else {
            continue;
        };
        if is_metadata_block(first) {
            continue;
        }

        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };
        let (start, end) = parse_timing_line(lines[timing_idx])
            .map_err(|message| AnalysisError::subtitle(block_start + timing_idx, message))?;

        cues.push(Cue {
            start,
            end,
            lines: lines[timing_idx + 1..].iter().map(|l| decode_entities(l.trim())).collect(),
        });
    }

    Ok(cues)
}

fn is_metadata_block(first_line: &str) -> bool {
    let first_line = first_line.trim_start();
    ["WEBVTT", "NOTE", "STYLE", "REGION"]
        .iter()
        .any(|keyword| first_line.starts_with(keyword))
}

/// Parse `start --> end [settings]`
fn parse_timing_line(line: &str) -> std::result::Result<(Duration, Duration), String> {
    let (start, rest) = line
        .split_once("-->")
        .ok_or_else(|| "missing timing arrow".to_string())?;
    let end = rest.split_whitespace().next().unwrap_or("");

    Ok((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse `HH:MM:SS.mmm`, `MM:SS.mmm` or the SRT form `HH:MM:SS,mmm`
pub fn parse_timestamp(timestamp: &str) -> std::result::Result<Duration, String> {
    let invalid = || format!("invalid timestamp '{}'", timestamp);

    let (clock, millis) = match timestamp.split_once(|c: char| c == '.' || c == ',') {
        Some((clock, frac)) => (clock, frac),
        None => (timestamp, "0"),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(invalid()),
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
    if millis.is_empty() || millis.len() > 3 || !millis.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    // ".5" means 500ms
    let milliseconds: u64 = format!("{:0<3}", millis).parse().map_err(|_| invalid())?;

    let total_seconds = hours * 3600 + minutes * 60 + seconds;
    Ok(Duration::from_millis(total_seconds * 1000 + milliseconds))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
