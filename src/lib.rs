//! # News Sentiment
//!
//! A concurrent fetch → extract → classify pipeline for news articles.
//!
//! ## Features
//!
//! - Resolves comma-delimited search terms to articles through NewsAPI
//! - Downloads and parses every article concurrently into an immutable [`Digest`]
//!   (metadata, keywords, summary, truncated body, named entities)
//! - Scores digests with a pluggable sentiment [`Classifier`]
//!   (local lexicon or an OpenAI-compatible chat model)
//! - Emits one JSON report per run
//!
//! ## Architecture
//!
//! 1. **Search**: [`Pipeline::fetch_term`] asks the [`SearchClient`] for matching articles
//! 2. **Processing**: each article is downloaded, then parsed and digested on the blocking pool
//! 3. **Fan-out**: [`Pipeline::fetch_terms`] runs every term of a batch concurrently
//! 4. **Classification**: [`SentimentStage::classify_all`] scores digests concurrently
//!
//! Every level preserves input order and fails as a whole on the first error.

pub mod cli;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod models;
pub mod nlp;
pub mod outputs;
pub mod pipeline;
pub mod processor;
pub mod scrapers;
pub mod search;
pub mod sentiment;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{ClassifierKind, PipelineConfig, PipelineSettings};
pub use error::{ErrorKind, NewsError, Result};
pub use models::{ArticleRef, Classification, ClassifiedDigest, Digest, Prediction, TermResult};
pub use pipeline::Pipeline;
pub use processor::ArticleProcessor;
pub use scrapers::{ArticleFetcher, HttpArticleFetcher};
pub use search::{NewsApiClient, SearchClient, SearchQuery};
pub use sentiment::{ChatClassifier, Classifier, LexiconClassifier, SentimentStage};
