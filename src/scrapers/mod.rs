//! Article download and parsing.
//!
//! Turning an [`ArticleRef`] into structured content is split into three
//! sequential steps, each of which may fail independently:
//!
//! 1. **Download**: fetch the raw document (network I/O, async)
//! 2. **Parse**: extract markup, title, authors, publish date and body (CPU)
//! 3. **NLP**: derive keywords and a summary from the parsed body (CPU)
//!
//! # Implementations
//!
//! | Fetcher | Module | Notes |
//! |---------|--------|-------|
//! | Generic HTML | [`article`] | `reqwest` download, `scraper` parse, JSON-LD and meta-tag fallbacks |

pub mod article;

pub use article::HttpArticleFetcher;

use crate::error::Result;
use crate::models::{ArticleNlp, ArticleRef, ParsedArticle};

/// The fetch/parse collaborator driven by the article processor.
///
/// `parse` and `nlp` are synchronous and may be CPU-heavy; the processor
/// runs them on the blocking pool, hence the `Send + Sync + 'static` bound.
pub trait ArticleFetcher: Send + Sync + 'static {
    /// Download the raw document behind `article`.
    async fn download(&self, article: &ArticleRef) -> Result<String>;

    /// Extract structural fields from a downloaded document.
    fn parse(&self, url: &str, html: String) -> Result<ParsedArticle>;

    /// Derive keywords and a summary from a parsed article.
    fn nlp(&self, parsed: &ParsedArticle) -> Result<ArticleNlp>;
}
