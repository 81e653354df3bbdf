//! Generic news article fetcher.
//!
//! Works on arbitrary publisher pages rather than one outlet's layout. Each
//! field is looked up in structured data first and falls back to common
//! markup:
//!
//! | Field | Lookup order |
//! |-------|--------------|
//! | title | `og:title`, first `<h1>`, `<title>` |
//! | authors | JSON-LD `author`, `meta[name=author]` |
//! | publish date | JSON-LD `datePublished`, `article:published_time`, `<time datetime>` |
//! | body | `<article> p`, then every `<p>` |
//!
//! A page with no paragraphs (video, consent wall) parses to an empty body
//! and yields an empty digest rather than an error.

use crate::error::{NewsError, Result};
use crate::models::{ArticleNlp, ArticleRef, ParsedArticle};
use crate::nlp::summary::{KEYWORD_COUNT, SUMMARY_SENTENCES, keywords, summarize};
use crate::scrapers::ArticleFetcher;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("page selector is valid")
}

/// Selectors used to pick fields out of a page.
struct PageSelectors {
    og_title: Selector,
    h1: Selector,
    title: Selector,
    json_ld: Selector,
    meta_author: Selector,
    meta_published: Selector,
    time: Selector,
    article_p: Selector,
    p: Selector,
}

static SELECTORS: Lazy<PageSelectors> = Lazy::new(|| PageSelectors {
    og_title: selector("meta[property='og:title']"),
    h1: selector("h1"),
    title: selector("title"),
    json_ld: selector("script[type='application/ld+json']"),
    meta_author: selector("meta[name='author']"),
    meta_published: selector("meta[property='article:published_time']"),
    time: selector("time[datetime]"),
    article_p: selector("article p"),
    p: selector("p"),
});

/// Downloads pages over HTTP and parses them with `scraper`.
#[derive(Debug, Clone)]
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl ArticleFetcher for HttpArticleFetcher {
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    async fn download(&self, article: &ArticleRef) -> Result<String> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(&article.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Downloaded article"
        );
        Ok(body)
    }

    fn parse(&self, url: &str, html: String) -> Result<ParsedArticle> {
        let source = source_of(url)?;
        let sel = &*SELECTORS;
        let document = Html::parse_document(&html);

        let title = extract_title(&document, sel);
        let authors = extract_authors(&document, sel);
        let publish_date = extract_publish_date(&document, sel);
        let text = extract_body(&document, sel);
        if text.is_empty() {
            warn!(%url, "No article body found; keeping an empty digest");
        }

        info!(%url, bytes = text.len(), authors = authors.len(), "Parsed article");
        Ok(ParsedArticle {
            html,
            source,
            title,
            authors,
            publish_date,
            text,
        })
    }

    fn nlp(&self, parsed: &ParsedArticle) -> Result<ArticleNlp> {
        if parsed.text.trim().is_empty() {
            return Ok(ArticleNlp {
                keywords: Vec::new(),
                summary: String::new(),
            });
        }
        Ok(ArticleNlp {
            keywords: keywords(&parsed.title, &parsed.text, KEYWORD_COUNT),
            summary: summarize(&parsed.title, &parsed.text, SUMMARY_SENTENCES),
        })
    }
}

/// `scheme://host` of an article URL.
fn source_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| NewsError::Parse(format!("invalid URL {url}: {e}")))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| NewsError::Parse(format!("URL has no host: {url}")))?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("").split_whitespace().join(" ")
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

fn extract_title(document: &Html, sel: &PageSelectors) -> String {
    meta_content(document, &sel.og_title)
        .or_else(|| {
            document
                .select(&sel.h1)
                .map(element_text)
                .find(|t| !t.is_empty())
        })
        .or_else(|| document.select(&sel.title).map(element_text).next())
        .unwrap_or_default()
}

/// Every JSON-LD object on the page, with top-level arrays and `@graph`
/// containers flattened.
fn json_ld_objects(document: &Html, sel: &PageSelectors) -> Vec<serde_json::Value> {
    let mut objects = Vec::new();
    for script in document.select(&sel.json_ld) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<serde_json::Value>(raw.trim()) else {
            continue;
        };
        let mut stack = vec![json];
        while let Some(value) = stack.pop() {
            match value {
                serde_json::Value::Array(items) => stack.extend(items.into_iter().rev()),
                serde_json::Value::Object(mut obj) => {
                    if let Some(graph) = obj.remove("@graph") {
                        stack.push(graph);
                    }
                    objects.push(serde_json::Value::Object(obj));
                }
                _ => {}
            }
        }
    }
    objects
}

fn author_names(author: &serde_json::Value, out: &mut Vec<String>) {
    match author {
        serde_json::Value::Array(arr) => arr.iter().for_each(|a| author_names(a, out)),
        serde_json::Value::Object(obj) => {
            if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                out.push(name.trim().to_string());
            }
        }
        serde_json::Value::String(s) => out.push(s.trim().to_string()),
        _ => {}
    }
}

fn extract_authors(document: &Html, sel: &PageSelectors) -> Vec<String> {
    let mut authors = Vec::new();
    for object in json_ld_objects(document, sel) {
        if let Some(author) = object.get("author") {
            author_names(author, &mut authors);
        }
    }
    if authors.is_empty() {
        authors.extend(
            document
                .select(&sel.meta_author)
                .filter_map(|el| el.value().attr("content"))
                .map(|c| c.trim().to_string()),
        );
    }
    authors.into_iter().filter(|a| !a.is_empty()).unique().collect()
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates taken as UTC midnight.
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
        let date = NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc).fixed_offset())
    })
}

fn extract_publish_date(document: &Html, sel: &PageSelectors) -> Option<DateTime<FixedOffset>> {
    json_ld_objects(document, sel)
        .iter()
        .filter_map(|o| o.get("datePublished").and_then(|d| d.as_str()))
        .find_map(parse_date)
        .or_else(|| meta_content(document, &sel.meta_published).and_then(|d| parse_date(&d)))
        .or_else(|| {
            document
                .select(&sel.time)
                .filter_map(|el| el.value().attr("datetime"))
                .find_map(parse_date)
        })
}

fn extract_body(document: &Html, sel: &PageSelectors) -> String {
    let paragraphs = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect()
    };
    let mut body = paragraphs(&sel.article_p);
    if body.is_empty() {
        body = paragraphs(&sel.p);
    }
    body.join("\n")
}
