//! Episode discovery in the metadata directory
//!
//! `youtube-dl` writes one file per artifact, named
//! `{playlist_index}.{title}.vid.{ext}`. Files of the same title are grouped
//! into an [`Episode`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::alignment::{Alignment, Question, TimestampResult};
use crate::config::EpisodeConfig;
use crate::error::{AnalysisError, Result};

/// Extension of the downloaded description
pub const DESCRIPTION_EXTENSION: &str = "description";

/// Extension of the English auto-generated subtitles
pub const SUBTITLE_EXTENSION: &str = "en.vtt";

/// Extension of the cached analysis results
pub const RESULTS_EXTENSION: &str = "analyze.results";

/// Results extension written by earlier deployments. Still read so existing
/// caches are reused; new results are always written as `RESULTS_EXTENSION`.
pub const LEGACY_RESULTS_EXTENSION: &str = "anylize.results";

/// Kind of artifact a metadata file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Description,
    Subtitles,
    Results,
    LegacyResults,
}

impl ArtifactKind {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            DESCRIPTION_EXTENSION => Some(Self::Description),
            SUBTITLE_EXTENSION => Some(Self::Subtitles),
            RESULTS_EXTENSION => Some(Self::Results),
            LEGACY_RESULTS_EXTENSION => Some(Self::LegacyResults),
            _ => None,
        }
    }
}

/// Parts of a metadata file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub raw_number: String,
    pub number: i64,
    pub title: String,
    pub kind: ArtifactKind,
}

/// Split `{index}.{title}.vid.{ext}`; titles may contain dots themselves
pub fn parse_file_name(name: &str) -> Option<ArtifactName> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() < 4 {
        return None;
    }

    let raw_number = parts[0];
    let number: i64 = raw_number.parse().ok()?;

    let vid_pos = parts.iter().rposition(|part| *part == "vid")?;
    if vid_pos < 1 {
        return None;
    }
    let kind = ArtifactKind::from_extension(&parts[vid_pos + 1..].join("."))?;

    Some(ArtifactName {
        raw_number: raw_number.to_string(),
        number,
        title: parts[1..vid_pos].join("."),
        kind,
    })
}

/// Persisted analysis of one episode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeResults {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(rename = "timeStamp", default)]
    pub timestamps: Vec<TimestampResult>,
    #[serde(default)]
    pub err: String,
}

impl EpisodeResults {
    pub fn failed(err: impl ToString) -> Self {
        Self {
            err: err.to_string(),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        !self.err.is_empty()
    }
}

impl From<Alignment> for EpisodeResults {
    fn from(alignment: Alignment) -> Self {
        Self {
            questions: alignment.questions,
            timestamps: alignment.timestamps,
            err: String::new(),
        }
    }
}

/// A fetched episode and the artifacts found for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub number: i64,
    pub raw_number: String,
    pub name: String,
    pub found_description: bool,
    #[serde(rename = "foundVTT")]
    pub found_vtt: bool,
    pub found_results: Option<EpisodeResults>,
}

impl Episode {
    fn new(raw_number: &str, number: i64, name: &str) -> Self {
        Self {
            number,
            raw_number: raw_number.to_string(),
            name: name.to_string(),
            found_description: false,
            found_vtt: false,
            found_results: None,
        }
    }

    /// File name prefix shared by every artifact of the episode
    pub fn base_name(&self) -> String {
        format!("{}.{}.vid.", self.raw_number, self.name)
    }

    pub fn description_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", self.base_name(), DESCRIPTION_EXTENSION))
    }

    pub fn subtitle_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", self.base_name(), SUBTITLE_EXTENSION))
    }

    pub fn results_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", self.base_name(), RESULTS_EXTENSION))
    }

    /// Both inputs are present and nothing has been cached yet
    pub fn needs_analysis(&self) -> bool {
        self.found_results.is_none() && self.found_description && self.found_vtt
    }
}

/// Check the title against the configured series patterns
pub fn is_series_episode(title: &str, config: &EpisodeConfig) -> bool {
    let lower = title.to_lowercase();
    if config.exclude_patterns.iter().any(|p| lower.contains(&p.to_lowercase())) {
        return false;
    }
    config.include_patterns.iter().any(|p| lower.contains(&p.to_lowercase()))
}

async fn load_results(path: &Path) -> EpisodeResults {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Failed to parse results file {}: {}", path.display(), e);
            EpisodeResults::failed(e)
        }),
        Err(e) => {
            warn!("Failed to read results file {}: {}", path.display(), e);
            EpisodeResults::failed(e)
        }
    }
}

fn has_current_results(dir: &Path, artifact: &ArtifactName) -> bool {
    dir.join(format!("{}.{}.vid.{}", artifact.raw_number, artifact.title, RESULTS_EXTENSION))
        .is_file()
}

/// Scan the metadata directory and group artifacts by episode, ordered by number
pub async fn scan_episodes(dir: &Path, config: &EpisodeConfig) -> Result<Vec<Episode>> {
    if !dir.is_dir() {
        return Err(AnalysisError::unavailable(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "metadata directory does not exist"),
        ));
    }

    let mut episodes: HashMap<String, Episode> = HashMap::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| AnalysisError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();

        let Some(artifact) = parse_file_name(&file_name) else {
            debug!("Ignoring file with unexpected name: {}", file_name);
            continue;
        };
        if !is_series_episode(&artifact.title, config) {
            continue;
        }

        let episode = episodes
            .entry(artifact.title.clone())
            .or_insert_with(|| Episode::new(&artifact.raw_number, artifact.number, &artifact.title));

        match artifact.kind {
            ArtifactKind::Description => episode.found_description = true,
            ArtifactKind::Subtitles => episode.found_vtt = true,
            ArtifactKind::Results => episode.found_results = Some(load_results(entry.path()).await),
            // the current name wins whatever the directory order
            ArtifactKind::LegacyResults => {
                if !has_current_results(dir, &artifact) {
                    episode.found_results = Some(load_results(entry.path()).await);
                }
            }
        }
    }

    let mut episodes: Vec<Episode> = episodes.into_values().collect();
    episodes.sort_by_key(|ep| ep.number);
    debug!("📁 Found {} episodes in {}", episodes.len(), dir.display());
    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_name() {
        let parsed = parse_file_name("12.Ask Kati Anything. Ep 3.vid.en.vtt").unwrap();
        assert_eq!(parsed.raw_number, "12");
        assert_eq!(parsed.number, 12);
        assert_eq!(parsed.title, "Ask Kati Anything. Ep 3");
        assert_eq!(parsed.kind, ArtifactKind::Subtitles);

        let parsed = parse_file_name("007.AKA 1.vid.analyze.results").unwrap();
        assert_eq!(parsed.number, 7);
        assert_eq!(parsed.raw_number, "007");
        assert_eq!(parsed.kind, ArtifactKind::Results);
    }

    #[test]
    fn test_parse_file_name_rejects() {
        assert!(parse_file_name("a.b.vid").is_none());
        assert!(parse_file_name("x.AKA.vid.description").is_none());
        assert!(parse_file_name("1.AKA.vid.webm").is_none());
        assert!(parse_file_name("1.AKA.no.marker").is_none());
    }

    #[test]
    fn test_series_filter() {
        let config = EpisodeConfig::default();
        assert!(is_series_episode("Ask Kati Anything ep 5", &config));
        assert!(is_series_episode("AKA: questions", &config));
        assert!(!is_series_episode("AKA OTDM special", &config));
        assert!(!is_series_episode("Other show", &config));
    }

    #[test]
    fn test_episode_paths() {
        let episode = Episode::new("03", 3, "AKA three");
        let dir = Path::new("/meta");
        assert_eq!(episode.base_name(), "03.AKA three.vid.");
        assert_eq!(episode.subtitle_path(dir), dir.join("03.AKA three.vid.en.vtt"));
        assert_eq!(episode.results_path(dir), dir.join("03.AKA three.vid.analyze.results"));
    }

    #[test]
    fn test_episode_json_shape() {
        let mut episode = Episode::new("1", 1, "AKA one");
        episode.found_vtt = true;
        let json = serde_json::to_value(&episode).unwrap();
        assert_eq!(json["rawNumber"], "1");
        assert_eq!(json["foundVTT"], true);
        assert_eq!(json["foundDescription"], false);
        assert!(json["foundResults"].is_null());
    }

    #[test]
    fn test_parse_legacy_results_name() {
        let parsed = parse_file_name("4.AKA 4.vid.anylize.results").unwrap();
        assert_eq!(parsed.title, "AKA 4");
        assert_eq!(parsed.kind, ArtifactKind::LegacyResults);
    }

    #[tokio::test]
    async fn test_scan_reuses_legacy_results() {
        let dir = tempfile::TempDir::new().unwrap();
        let base = dir.path().join("4.AKA 4.vid.");
        let legacy = r#"{"questions":[{"full":"Q?","searchable":"q","shortent":"Q?"}],"timeStamp":[],"err":""}"#;
        tokio::fs::write(format!("{}description", base.display()), "1. Q?").await.unwrap();
        tokio::fs::write(format!("{}en.vtt", base.display()), "WEBVTT\n").await.unwrap();
        tokio::fs::write(format!("{}anylize.results", base.display()), legacy).await.unwrap();

        let episodes = scan_episodes(dir.path(), &EpisodeConfig::default()).await.unwrap();
        assert_eq!(episodes.len(), 1);
        let results = episodes[0].found_results.as_ref().unwrap();
        assert_eq!(results.questions[0].short, "Q?");
        assert!(!episodes[0].needs_analysis());
    }

    #[tokio::test]
    async fn test_current_results_win_over_legacy() {
        let dir = tempfile::TempDir::new().unwrap();
        let base = dir.path().join("5.AKA 5.vid.");
        tokio::fs::write(format!("{}anylize.results", base.display()), r#"{"err":"old"}"#)
            .await
            .unwrap();
        tokio::fs::write(format!("{}analyze.results", base.display()), r#"{"err":""}"#)
            .await
            .unwrap();

        let episodes = scan_episodes(dir.path(), &EpisodeConfig::default()).await.unwrap();
        let results = episodes[0].found_results.as_ref().unwrap();
        assert!(!results.is_error());
    }
}
