//! Command-line interface definitions for News Sentiment.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Flags override the values loaded from the optional YAML config; API keys
//! can also come from environment variables.

use crate::config::{ClassifierKind, PipelineConfig};
use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the News Sentiment application.
///
/// # Examples
///
/// ```sh
/// # Two terms from yesterday onward, lexicon sentiment
/// news_sentiment --terms "tesla,nvidia"
///
/// # Restricted sources, chat model, bounded concurrency
/// news_sentiment -t "federal reserve" -s reuters,bbc-news --classifier chat --max-concurrency 8
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-delimited search terms (taken literally, no trimming)
    #[arg(short, long)]
    pub terms: String,

    /// Comma-delimited NewsAPI source identifiers
    #[arg(short, long, default_value = "")]
    pub sources: String,

    /// Start of the search window (YYYY-MM-DD); defaults to yesterday
    #[arg(long = "from")]
    pub from_date: Option<NaiveDate>,

    /// Article language, e.g. `en`
    #[arg(short, long)]
    pub language: Option<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Sentiment classifier backend
    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierKind>,

    /// API key for the chat classifier endpoint
    #[arg(long, env = "CLASSIFIER_API_KEY", hide_env_values = true)]
    pub classifier_api_key: Option<String>,

    /// Cap on in-flight article and classifier jobs
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Per-call timeout in seconds for search, article and classifier calls
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Skip sentiment classification and report digests only
    #[arg(long)]
    pub no_classify: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(date) = self.from_date {
            config.from_date = Some(date);
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(key) = &self.newsapi_key {
            config.newsapi_key = Some(key.clone());
        }
        if let Some(kind) = self.classifier {
            config.classifier.kind = kind;
        }
        if let Some(key) = &self.classifier_api_key {
            config.classifier.api_key = Some(key.clone());
        }
        if let Some(n) = self.max_concurrency {
            config.max_concurrency = Some(n);
        }
        if let Some(secs) = self.timeout_secs {
            config.call_timeout_secs = Some(secs);
        }
    }
}
