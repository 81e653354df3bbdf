//! JSON report generation.
//!
//! A [`Report`] is built once per run from either the fetched
//! [`TermResult`]s or the classified [`Prediction`]s, and written to stdout
//! or to a file.
//!
//! # Output Structure
//!
//! ```text
//! {
//!   "generated_at": "2025-05-06T09:12:44Z",
//!   "from_date": "2025-05-05",
//!   "language": "en",
//!   "terms": [
//!     { "term": "tesla", "articles": [ { "url": ..., "sentiment": {...} } ] }
//!   ]
//! }
//! ```

use crate::config::PipelineSettings;
use crate::error::Result;
use crate::models::{Classification, Digest, Prediction, TermResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub from_date: NaiveDate,
    pub language: String,
    pub terms: Vec<TermReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermReport {
    pub term: String,
    pub articles: Vec<ArticleReport>,
}

/// One digest as it appears in the report. The raw markup is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleReport {
    pub url: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_tag: Option<String>,
    pub title: String,
    pub authors: Vec<String>,
    pub publish_date: Option<DateTime<FixedOffset>>,
    pub keywords: Vec<String>,
    pub summary: String,
    pub text: String,
    pub ners: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Classification>,
}

impl ArticleReport {
    fn new(digest: &Digest, sentiment: Option<&Classification>) -> Self {
        Self {
            url: digest.url().to_string(),
            source: digest.source().to_string(),
            source_tag: digest.source_tag(),
            title: digest.title().to_string(),
            authors: digest.authors().to_vec(),
            publish_date: digest.publish_date(),
            keywords: digest.keywords().to_vec(),
            summary: digest.summary().to_string(),
            text: digest.text().to_string(),
            ners: digest.ners().to_vec(),
            sentiment: sentiment.cloned(),
        }
    }
}

impl Report {
    fn empty(settings: &PipelineSettings) -> Self {
        Self {
            generated_at: Utc::now(),
            from_date: settings.from_date,
            language: settings.language.clone(),
            terms: Vec::new(),
        }
    }

    /// Report on unclassified digests.
    pub fn from_terms(results: &[TermResult], settings: &PipelineSettings) -> Self {
        let terms = results
            .iter()
            .map(|result| TermReport {
                term: result.term.clone(),
                articles: result.digests.iter().map(|d| ArticleReport::new(d, None)).collect(),
            })
            .collect();
        Self {
            terms,
            ..Self::empty(settings)
        }
    }

    /// Report on classified digests.
    pub fn from_predictions(predictions: &[Prediction], settings: &PipelineSettings) -> Self {
        let terms = predictions
            .iter()
            .map(|prediction| TermReport {
                term: prediction.term.clone(),
                articles: prediction
                    .results
                    .iter()
                    .map(|(digest, label)| ArticleReport::new(digest, Some(label)))
                    .collect(),
            })
            .collect();
        Self {
            terms,
            ..Self::empty(settings)
        }
    }

    pub fn article_count(&self) -> usize {
        self.terms.iter().map(|t| t.articles.len()).sum()
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Write `report` to `writer`, newline-terminated.
pub fn write_report<W: Write>(report: &Report, mut writer: W, pretty: bool) -> Result<()> {
    let json = report.to_json(pretty)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

/// Write `report` to a file, creating its parent directory if needed.
#[instrument(level = "info", skip(report, pretty))]
pub async fn write_report_file(report: &Report, path: &Path, pretty: bool) -> Result<()> {
    let json = report.to_json(pretty)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        info!(dir = %dir.display(), "Ensuring report directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(
        articles = report.article_count(),
        "Wrote JSON report"
    );
    Ok(())
}
