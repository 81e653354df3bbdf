//! Error taxonomy for the fetch-extract-classify pipeline.
//!
//! Every stage reports failures through [`NewsError`]. Nothing in the
//! pipeline recovers locally: an error raised inside any concurrent branch
//! crosses the join and fails the enclosing batch.

use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a [`NewsError`], one per pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Search or download failure.
    Fetch,
    /// Document structure could not be extracted.
    Parse,
    /// Keyword/summary derivation or tagging/chunking failure.
    Extraction,
    /// Sentiment classifier failure.
    Classification,
    /// A collaborator call exceeded the configured timeout.
    Timeout,
    /// Configuration could not be loaded.
    Config,
    /// A worker task panicked or was cancelled, the limiter closed, or the
    /// report could not be serialized.
    Internal,
}

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("classification error: {0}")]
    Classification(String),

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("concurrency limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),

    #[error("config error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NewsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsError::Fetch(_) | NewsError::Http(_) => ErrorKind::Fetch,
            NewsError::Parse(_) => ErrorKind::Parse,
            NewsError::Extraction(_) => ErrorKind::Extraction,
            NewsError::Classification(_) => ErrorKind::Classification,
            NewsError::Timeout { .. } => ErrorKind::Timeout,
            NewsError::Worker(_) | NewsError::Limiter(_) | NewsError::Json(_) => {
                ErrorKind::Internal
            }
            NewsError::Config(_) | NewsError::Yaml(_) | NewsError::Io(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_stage() {
        assert_eq!(NewsError::Fetch("quota".into()).kind(), ErrorKind::Fetch);
        assert_eq!(NewsError::Parse("no body".into()).kind(), ErrorKind::Parse);
        assert_eq!(
            NewsError::Classification("model down".into()).kind(),
            ErrorKind::Classification
        );
        let timeout = NewsError::Timeout {
            stage: "download",
            after: Duration::from_secs(3),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.to_string(), "download timed out after 3s");
    }
}
