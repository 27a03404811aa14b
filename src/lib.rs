/// AKA Question Timestamps - Rust Implementation
///
/// Finds where each question listed in an episode description is asked in the
/// episode's auto-generated subtitles, and serves the results over HTTP.

pub mod alignment;
pub mod api;
pub mod config;
pub mod episodes;
pub mod error;
pub mod fetch;
pub mod processing;
pub mod state;
pub mod transcription;

// Re-export main types for easy access
pub use crate::alignment::{align_episode, normalize, Alignment, Question, TimestampResult};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::episodes::{scan_episodes, Episode, EpisodeResults};
pub use crate::error::{AnalysisError, Result};
pub use crate::fetch::{MetadataFetcher, YoutubeDl};
pub use crate::processing::{analyze, analyze_episodes, refresh, ScanSummary};
pub use crate::state::{FetchGuard, ResultsStore};
pub use crate::transcription::{read_caption_lines, CaptionLine};
