use std::path::PathBuf;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for the analysis pipeline
///
/// Only structural failures live here. A question that cannot be located in the
/// transcript is reported through `TimestampResult::found` and a description
/// without a numbered list yields no questions; neither is an error.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("input unavailable: {}: {source}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid subtitle data at line {line}: {message}")]
    Subtitle { line: usize, message: String },

    #[error("results file error: {0}")]
    Results(#[from] serde_json::Error),

    #[error("metadata fetch failed: {0}")]
    Fetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn subtitle(line: usize, message: impl Into<String>) -> Self {
        Self::Subtitle {
            line,
            message: message.into(),
        }
    }
}
