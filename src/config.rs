//! Pipeline configuration.
//!
//! Configuration comes from an optional YAML file; every field has a
//! default, and CLI flags override whatever the file sets (see `main.rs`).
//!
//! ```yaml
//! newsapi_key: "..."
//! language: en
//! page_size: 20
//! max_concurrency: 16
//! call_timeout_secs: 60
//! classifier:
//!   kind: chat
//!   base_url: http://localhost:11434/v1
//!   model: llama3.1
//! ```

use crate::error::{NewsError, Result};
use crate::search::NEWSAPI_BASE_URL;
use crate::utils::yesterday;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

/// Which classifier backend scores digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Local word-weight lexicon.
    #[default]
    Lexicon,
    /// OpenAI-compatible chat completion endpoint.
    Chat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub kind: ClassifierKind,
    /// Base URL of the chat API, up to and including `/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Retries after the first failed chat request.
    pub max_retries: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Lexicon,
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            max_retries: 5,
        }
    }
}

/// Everything the binary needs to wire the pipeline together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub newsapi_base_url: String,
    pub newsapi_key: Option<String>,
    pub language: String,
    /// Start of the search window. Defaults to yesterday.
    pub from_date: Option<NaiveDate>,
    pub page_size: Option<u32>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Cap on in-flight article jobs and on in-flight classifier jobs.
    pub max_concurrency: Option<usize>,
    /// Timeout applied to every search, article and classifier call.
    pub call_timeout_secs: Option<u64>,
    pub classifier: ClassifierConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            newsapi_base_url: NEWSAPI_BASE_URL.to_string(),
            newsapi_key: None,
            language: "en".to_string(),
            from_date: None,
            page_size: None,
            user_agent: concat!("news_sentiment/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            max_concurrency: None,
            call_timeout_secs: None,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Io`] if the file cannot be read, and
    /// [`NewsError::Yaml`] or [`NewsError::Config`] if it is invalid.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&raw)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(NewsError::Config("language must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(NewsError::Config("request_timeout_secs must be positive".to_string()));
        }
        if self.call_timeout_secs == Some(0) {
            return Err(NewsError::Config("call_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Freeze the runtime settings.
    ///
    /// This is where the default search window is resolved: a missing
    /// `from_date` becomes yesterday's date, once, and stays fixed for the
    /// lifetime of the returned settings.
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            from_date: self.from_date.unwrap_or_else(yesterday),
            language: self.language.clone(),
            max_concurrency: self.max_concurrency,
            call_timeout: self.call_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Values injected into the pipeline at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Default start of the search window for [`fetch_terms`](crate::Pipeline::fetch_terms).
    pub from_date: NaiveDate,
    /// Default language for [`fetch_terms`](crate::Pipeline::fetch_terms).
    pub language: String,
    pub max_concurrency: Option<usize>,
    pub call_timeout: Option<Duration>,
}

impl PipelineSettings {
    pub fn new(from_date: NaiveDate, language: impl Into<String>) -> Self {
        Self {
            from_date,
            language: language.into(),
            max_concurrency: None,
            call_timeout: None,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}
