use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::index::{TimedWord, WordIndex};
use super::questions::Question;

/// Largest position gap between neighbouring matches of one cluster
pub const MAX_CLUSTER_GAP: usize = 6;

/// A cluster must be longer than this to count as the spoken question
pub const MIN_CLUSTER_LEN: usize = 5;

/// Time subtracted from the match so playback starts just before the question
pub const LEAD_IN: Duration = Duration::from_secs(3);

/// Number of best-cluster candidates reported per question
pub const MAX_REPORTED_CLUSTERS: usize = 3;

/// Outcome of locating one question in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampResult {
    #[serde(rename = "questionIdx")]
    pub question_index: usize,
    pub at_str: String,
    pub found: bool,
}

impl TimestampResult {
    fn not_found(question_index: usize) -> Self {
        Self {
            question_index,
            at_str: String::new(),
            found: false,
        }
    }
}

/// Collect the transcript positions of every searchable token, sorted
pub fn matching_positions(index: &WordIndex, searchable: &str) -> Vec<usize> {
    let mut positions: Vec<usize> = searchable
        .split(' ')
        .filter_map(|token| index.positions(token))
        .flatten()
        .copied()
        .collect();
    positions.sort_unstable();
    positions
}

/// Split sorted positions into proximity clusters and return the successive
/// "longest so far" clusters, oldest first, keeping at most the last
/// `MAX_REPORTED_CLUSTERS`.
///
/// A cluster is only recorded when it grows strictly longer than the best one
/// at that moment, so ties keep the earlier cluster. With no positions the
/// single empty cluster is returned.
pub fn best_clusters(positions: &[usize]) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new()];
    let mut best: Vec<usize> = vec![0];

    for &position in positions {
        let current = clusters.len() - 1;
        let joins = match clusters[current].last() {
            None => true,
            Some(&last) => position - last <= MAX_CLUSTER_GAP,
        };
        if !joins {
            clusters.push(vec![position]);
            continue;
        }

        clusters[current].push(position);
        let best_idx = best[best.len() - 1];
        if current != best_idx && clusters[current].len() > clusters[best_idx].len() {
            best.push(current);
        }
    }

    let skip = best.len().saturating_sub(MAX_REPORTED_CLUSTERS);
    best.into_iter()
        .skip(skip)
        .map(|idx| std::mem::take(&mut clusters[idx]))
        .collect()
}

/// Format a playback offset as `MM:SS`, or `H:MM:SS` from one hour on
pub fn format_timestamp(at: Duration) -> String {
    let total = at.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

fn cluster_result(question_index: usize, cluster: &[usize], words: &[TimedWord]) -> TimestampResult {
    if cluster.len() <= MIN_CLUSTER_LEN {
        return TimestampResult::not_found(question_index);
    }
    match cluster.first().and_then(|&first| words.get(first)) {
        Some(word) => TimestampResult {
            question_index,
            at_str: format_timestamp(word.at.saturating_sub(LEAD_IN)),
            found: true,
        },
        None => TimestampResult::not_found(question_index),
    }
}

/// Locate a single question, yielding one result per retained cluster
pub fn align_question(
    question_index: usize,
    question: &Question,
    index: &WordIndex,
    words: &[TimedWord],
) -> Vec<TimestampResult> {
    let positions = matching_positions(index, &question.searchable);
    let clusters = best_clusters(&positions);
    debug!(
        "Question {}: {} matching positions, {} candidate clusters",
        question_index,
        positions.len(),
        clusters.len()
    );

    clusters
        .iter()
        .map(|cluster| cluster_result(question_index, cluster, words))
        .collect()
}

/// Locate every question; results are grouped by question in input order
pub fn align(index: &WordIndex, words: &[TimedWord], questions: &[Question]) -> Vec<TimestampResult> {
    questions
        .par_iter()
        .enumerate()
        .map(|(question_index, question)| align_question(question_index, question, index, words))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
