//! In-memory collaborators shared by the unit tests.

use crate::error::{NewsError, Result};
use crate::models::{ArticleNlp, ArticleRef, Classification, ParsedArticle};
use crate::scrapers::ArticleFetcher;
use crate::search::{SearchClient, SearchQuery};
use crate::sentiment::Classifier;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Download,
    Parse,
    Nlp,
}

/// Serves canned search results per term, after a per-term delay.
#[derive(Default)]
pub(crate) struct FakeIndex {
    results: HashMap<String, (Duration, Vec<ArticleRef>)>,
    failing: Vec<String>,
    pub(crate) queries: Mutex<Vec<SearchQuery>>,
}

impl FakeIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_term(mut self, term: &str, delay: Duration, urls: &[&str]) -> Self {
        let refs = urls.iter().map(|u| ArticleRef::new(*u)).collect();
        self.results.insert(term.to_string(), (delay, refs));
        self
    }

    pub(crate) fn failing(mut self, term: &str) -> Self {
        self.failing.push(term.to_string());
        self
    }
}

impl SearchClient for FakeIndex {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ArticleRef>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.failing.contains(&query.term) {
            return Err(NewsError::Fetch("quota exceeded".to_string()));
        }
        let (delay, refs) = self.results.get(&query.term).cloned().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(refs)
    }
}

/// Serves canned bodies per URL. The parsed title is the URL itself so the
/// NLP step can tell articles apart.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    bodies: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    failures: HashMap<String, Step>,
    in_flight: AtomicUsize,
    pub(crate) peak: AtomicUsize,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub(crate) fn failing(mut self, url: &str, step: Step) -> Self {
        self.failures.insert(url.to_string(), step);
        self
    }

    fn fails_at(&self, url: &str, step: Step) -> bool {
        self.failures.get(url) == Some(&step)
    }
}

impl ArticleFetcher for FakeFetcher {
    async fn download(&self, article: &ArticleRef) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&article.url) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fails_at(&article.url, Step::Download) {
            return Err(NewsError::Fetch(format!("connection reset: {}", article.url)));
        }
        self.bodies
            .get(&article.url)
            .cloned()
            .ok_or_else(|| NewsError::Fetch(format!("404: {}", article.url)))
    }

    fn parse(&self, url: &str, html: String) -> Result<ParsedArticle> {
        if self.fails_at(url, Step::Parse) {
            return Err(NewsError::Parse(format!("unparseable: {url}")));
        }
        let parsed = url::Url::parse(url).map_err(|e| NewsError::Parse(e.to_string()))?;
        Ok(ParsedArticle {
            source: format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or_default()),
            title: url.to_string(),
            authors: vec!["Staff".to_string()],
            publish_date: None,
            text: html.clone(),
            html,
        })
    }

    fn nlp(&self, parsed: &ParsedArticle) -> Result<ArticleNlp> {
        if self.fails_at(&parsed.title, Step::Nlp) {
            return Err(NewsError::Extraction(format!("nlp failed: {}", parsed.title)));
        }
        Ok(ArticleNlp {
            keywords: vec!["fake".to_string()],
            summary: parsed.text.split_whitespace().take(5).collect::<Vec<_>>().join(" "),
        })
    }
}

/// Labels every text `LABEL:<text>`, optionally sleeping or failing first.
#[derive(Default)]
pub(crate) struct FakeClassifier {
    delays: HashMap<String, Duration>,
    failing: Vec<String>,
    pub(crate) calls: AtomicUsize,
}

impl FakeClassifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    pub(crate) fn failing(mut self, text: &str) -> Self {
        self.failing.push(text.to_string());
        self
    }
}

impl Classifier for FakeClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(text) {
            std::thread::sleep(*delay);
        }
        if self.failing.iter().any(|t| t == text) {
            return Err(NewsError::Classification(format!("model rejected: {text}")));
        }
        Ok(Classification {
            label: format!("LABEL:{text}"),
            score: 0.9,
        })
    }
}
