//! Metadata fetching through `youtube-dl`

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tracing::{info, warn};

use crate::config::FetchConfig;
use crate::error::{AnalysisError, Result};

/// Exit code youtube-dl uses when `--max-downloads` stopped it early
const MAX_DOWNLOADS_REACHED: i32 = 101;

/// Source of episode descriptions and subtitles
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    /// Fetch the latest episodes into the metadata directory
    async fn fetch(&self, first_time: bool) -> Result<()>;
}

/// Runs youtube-dl with subtitles and description only, skipping the video
#[derive(Debug, Clone)]
pub struct YoutubeDl {
    binary: PathBuf,
    meta_dir: PathBuf,
    playlist_url: String,
    first_max_downloads: u32,
    max_downloads: u32,
}

impl YoutubeDl {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            binary: resolve_binary(config),
            meta_dir: config.meta_dir.clone(),
            playlist_url: config.playlist_url.clone(),
            first_max_downloads: config.first_max_downloads,
            max_downloads: config.max_downloads,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments passed to youtube-dl
    pub fn args(&self, first_time: bool) -> Vec<String> {
        let max = if first_time {
            self.first_max_downloads
        } else {
            self.max_downloads
        };

        vec![
            "-4".to_string(),
            "--yes-playlist".to_string(),
            "--ignore-errors".to_string(),
            "--output".to_string(),
            "%(playlist_index)s.%(title)s.vid".to_string(),
            "--write-auto-sub".to_string(),
            "--write-description".to_string(),
            "--max-downloads".to_string(),
            max.to_string(),
            "--skip-download".to_string(),
            self.playlist_url.clone(),
        ]
    }
}

/// Prefer a binary shipped next to the service over the system one
fn resolve_binary(config: &FetchConfig) -> PathBuf {
    if config.local_binary.is_file() {
        match std::fs::canonicalize(&config.local_binary) {
            Ok(path) => return path,
            Err(e) => warn!("Cannot resolve {}: {}", config.local_binary.display(), e),
        }
    }
    PathBuf::from(&config.system_binary)
}

/// Decide the fetch outcome from the exit status and the combined output
pub fn interpret_outcome(status: ExitStatus, output: &str) -> Result<()> {
    if output.is_empty() {
        if status.success() {
            return Err(AnalysisError::Fetch(
                "youtube-dl exited without any output nor error code".to_string(),
            ));
        }
        return Err(AnalysisError::Fetch(format!("youtube-dl exited with error: {}", status)));
    }

    if status.success() || status.code() == Some(MAX_DOWNLOADS_REACHED) {
        return Ok(());
    }

    Err(AnalysisError::Fetch(output.to_string()))
}

#[async_trait]
impl MetadataFetcher for YoutubeDl {
    async fn fetch(&self, first_time: bool) -> Result<()> {
        info!(
            "⬇️ Fetching latest episode metadata into {} (first run: {})",
            self.meta_dir.display(),
            first_time
        );

        let output = tokio::process::Command::new(&self.binary)
            .args(self.args(first_time))
            .current_dir(&self.meta_dir)
            .output()
            .await
            .map_err(|e| AnalysisError::Fetch(format!("cannot run {}: {}", self.binary.display(), e)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !combined.is_empty() {
            info!("youtube-dl output:\n{}", combined);
        }

        interpret_outcome(output.status, &combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn test_args_use_download_limits() {
        let fetcher = YoutubeDl::new(&FetchConfig::default());
        let first = fetcher.args(true);
        let later = fetcher.args(false);

        let limit = |args: &[String]| {
            let idx = args.iter().position(|a| a == "--max-downloads").unwrap();
            args[idx + 1].clone()
        };
        assert_eq!(limit(&first), "10");
        assert_eq!(limit(&later), "5");
        assert!(first.contains(&"--skip-download".to_string()));
        assert_eq!(first.last().unwrap(), &FetchConfig::default().playlist_url);
    }

    #[test]
    fn test_missing_local_binary_falls_back() {
        let config = FetchConfig {
            local_binary: PathBuf::from("/nonexistent/youtube-dl"),
            ..FetchConfig::default()
        };
        assert_eq!(YoutubeDl::new(&config).binary(), Path::new("youtube-dl"));
    }

    #[cfg(unix)]
    #[test]
    fn test_interpret_outcome() {
        assert!(interpret_outcome(status(0), "downloaded").is_ok());
        assert!(interpret_outcome(status(101), "max downloads reached").is_ok());
        assert!(interpret_outcome(status(0), "").is_err());

        match interpret_outcome(status(1), "ERROR: unable to download") {
            Err(AnalysisError::Fetch(message)) => assert_eq!(message, "ERROR: unable to download"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match interpret_outcome(status(2), "") {
            Err(AnalysisError::Fetch(message)) => assert!(message.contains("exited with error")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
