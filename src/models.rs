//! Data models for articles moving through the pipeline.
//!
//! This module defines the values produced and consumed by each stage:
//! - [`ArticleRef`]: Handle to one article as returned by the search index
//! - [`ParsedArticle`] / [`ArticleNlp`]: Outputs of the fetch/parse collaborator
//! - [`Digest`]: Immutable record of one fully processed article
//! - [`TermResult`]: Digests gathered for one search term
//! - [`Classification`] / [`Prediction`]: Sentiment outcomes
//!
//! Every value is created fresh per pipeline invocation. None of them is
//! mutated after construction.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Maximum number of whitespace-delimited tokens kept in [`Digest::text`].
pub const DIGEST_TOKEN_LIMIT: usize = 300;

/// A handle to one article, as resolved by the search collaborator.
///
/// Only `url` is needed to process the article. The remaining fields are
/// whatever the index reported and are recorded on the processing span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    /// Absolute article URL.
    pub url: String,
    /// Headline as reported by the index.
    pub title: Option<String>,
    /// Publisher name as reported by the index.
    pub publisher: Option<String>,
}

impl ArticleRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            publisher: None,
        }
    }
}

/// Structural fields extracted from a downloaded article document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    /// Raw markup as downloaded.
    pub html: String,
    /// `scheme://host` of the article URL.
    pub source: String,
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
    /// Full body text, paragraphs separated by newlines.
    pub text: String,
}

/// Fields derived from the parsed text by the NLP step.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleNlp {
    /// Most frequent content words, most frequent first.
    pub keywords: Vec<String>,
    /// Short extractive summary.
    pub summary: String,
}

/// An immutable record describing one processed article.
///
/// A `Digest` is only ever built from fully populated parts by the article
/// processor; there is no way to obtain a partially filled one and no way to
/// change a field afterwards.
///
/// # Invariants
///
/// - [`text`](Digest::text) holds at most [`DIGEST_TOKEN_LIMIT`] tokens
/// - [`ners`](Digest::ners) holds no duplicates, in first-occurrence order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Digest {
    url: String,
    html: String,
    source: String,
    authors: Vec<String>,
    publish_date: Option<DateTime<FixedOffset>>,
    keywords: Vec<String>,
    summary: String,
    title: String,
    text: String,
    ners: Vec<String>,
}

impl Digest {
    /// Assemble a digest from the outputs of every processing step.
    ///
    /// `text` must already be truncated and `ners` already deduplicated.
    pub(crate) fn assemble(
        url: String,
        parsed: ParsedArticle,
        nlp: ArticleNlp,
        text: String,
        ners: Vec<String>,
    ) -> Self {
        Self {
            url,
            html: parsed.html,
            source: parsed.source,
            authors: parsed.authors,
            publish_date: parsed.publish_date,
            keywords: nlp.keywords,
            summary: nlp.summary,
            title: parsed.title,
            text,
            ners,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn publish_date(&self) -> Option<DateTime<FixedOffset>> {
        self.publish_date
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text truncated to the first [`DIGEST_TOKEN_LIMIT`] tokens.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Named-entity mentions found in [`text`](Digest::text).
    pub fn ners(&self) -> &[String] {
        &self.ners
    }

    /// Extract the domain name (before .com/.org/etc) from the source.
    /// For example: "https://www.reuters.com" -> "reuters"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.source).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            return Some(parts[parts.len() - 2].to_string());
        }
        None
    }
}

/// Digests successfully produced for one search term.
///
/// Digests appear in the order the search index returned their articles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermResult {
    pub term: String,
    pub digests: Vec<Digest>,
}

/// Outcome of one classifier invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Label as emitted by the classifier, e.g. `POSITIVE`.
    pub label: String,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f32,
}

/// A digest paired with its classifier outcome.
pub type ClassifiedDigest = (Digest, Classification);

/// Classified digests for one search term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub term: String,
    pub results: Vec<ClassifiedDigest>,
}
