use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::alignment::{align_episode, Alignment};
use crate::config::EpisodeConfig;
use crate::episodes::{scan_episodes, Episode, EpisodeResults};
use crate::error::{AnalysisError, Result};
use crate::fetch::MetadataFetcher;
use crate::state::ResultsStore;
use crate::transcription::read_caption_lines;

/// Summary of one pass over the metadata directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub episodes: usize,
    pub analyzed: usize,
    pub failed: usize,
}

/// Read both inputs and align the description's questions against the transcript
pub async fn analyze(transcript_path: &Path, description_path: &Path) -> Result<Alignment> {
    let captions = read_caption_lines(transcript_path).await?;
    let description = tokio::fs::read_to_string(description_path)
        .await
        .map_err(|e| AnalysisError::unavailable(description_path, e))?;

    // CPU bound; keep it off the async workers
    let alignment = tokio::task::spawn_blocking(move || align_episode(&captions, &description))
        .await
        .map_err(|e| AnalysisError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    Ok(alignment)
}

/// Analyze one episode; a failure is captured in the results, not returned
pub async fn analyze_episode(meta_dir: &Path, episode: &Episode) -> EpisodeResults {
    let start = Instant::now();
    match analyze(&episode.subtitle_path(meta_dir), &episode.description_path(meta_dir)).await {
        Ok(alignment) => {
            info!(
                "✅ Analyzed episode {} ({} questions) in {:.2}s",
                episode.raw_number,
                alignment.questions.len(),
                start.elapsed().as_secs_f64()
            );
            alignment.into()
        }
        Err(e) => {
            warn!("❌ Analysis of episode {} failed: {}", episode.raw_number, e);
            EpisodeResults::failed(e)
        }
    }
}

async fn save_results(path: &Path, results: &EpisodeResults) -> Result<()> {
    let json = serde_json::to_string(results)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Analyze every episode that has both inputs and no cached results, persist
/// the new results, then publish the full episode list to the store
pub async fn analyze_episodes(meta_dir: &Path, config: &EpisodeConfig, store: &ResultsStore) -> Result<ScanSummary> {
    let mut episodes = scan_episodes(meta_dir, config).await?;
    let mut summary = ScanSummary {
        episodes: episodes.len(),
        ..ScanSummary::default()
    };

    for episode in episodes.iter_mut() {
        if !episode.needs_analysis() {
            debug!("Skipping episode {}", episode.raw_number);
            continue;
        }

        let results = analyze_episode(meta_dir, episode).await;
        if results.is_error() {
            summary.failed += 1;
        }

        let path = episode.results_path(meta_dir);
        if let Err(e) = save_results(&path, &results).await {
            // retried on the next scan
            error!("Failed to write results {}: {}", path.display(), e);
            continue;
        }

        summary.analyzed += 1;
        episode.found_results = Some(results);
    }

    store.replace(episodes).await;
    info!(
        "📊 Episode scan complete: {} episodes, {} analyzed, {} failed",
        summary.episodes, summary.analyzed, summary.failed
    );
    Ok(summary)
}

/// Fetch new metadata, then analyze. The caller must hold the store's fetch guard.
pub async fn refresh(
    fetcher: &dyn MetadataFetcher,
    first_time: bool,
    meta_dir: &Path,
    config: &EpisodeConfig,
    store: &ResultsStore,
) -> Result<ScanSummary> {
    fetcher.fetch(first_time).await?;
    analyze_episodes(meta_dir, config, store).await
}
