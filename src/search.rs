//! Article index search.
//!
//! The pipeline resolves each term to a list of [`ArticleRef`]s through the
//! [`SearchClient`] trait. [`NewsApiClient`] implements it against the
//! NewsAPI `/v2/everything` endpoint.

use crate::error::{NewsError, Result};
use crate::models::ArticleRef;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org";

/// Parameters for one index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    /// Comma-delimited source identifiers, passed through verbatim.
    pub sources: String,
    pub from_date: NaiveDate,
    pub language: String,
}

/// Resolves a query to the articles that match it.
pub trait SearchClient {
    /// Run one query against the index.
    ///
    /// Transport or quota failures are returned as-is; the caller does not
    /// retry.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ArticleRef>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    url: Option<String>,
    title: Option<String>,
    source: Option<NewsApiSource>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Client for the NewsAPI `everything` search.
#[derive(Clone)]
pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    page_size: Option<u32>,
}

impl std::fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NewsApiClient {
    /// Build a client against `base_url` (no trailing `/v2`).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        user_agent: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: None,
        })
    }

    /// Limit how many articles one query returns.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }
}

impl SearchClient for NewsApiClient {
    #[instrument(level = "info", skip_all, fields(term = %query.term, from = %query.from_date))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ArticleRef>> {
        let t0 = Instant::now();
        let url = format!("{}/v2/everything", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.term.clone()),
            ("from", query.from_date.format("%Y-%m-%d").to_string()),
            ("language", query.language.clone()),
        ];
        if !query.sources.is_empty() {
            params.push(("sources", query.sources.clone()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pageSize", page_size.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&params)
            .send()
            .await?;
        let http_status = response.status();
        let body: EverythingResponse = response.json().await.map_err(|e| {
            NewsError::Fetch(format!("unreadable search response ({http_status}): {e}"))
        })?;

        if body.status != "ok" {
            let code = body.code.unwrap_or_else(|| http_status.to_string());
            let message = body.message.unwrap_or_default();
            warn!(%code, %message, "Search request rejected");
            return Err(NewsError::Fetch(format!("search failed [{code}]: {message}")));
        }

        let refs: Vec<ArticleRef> = body
            .articles
            .into_iter()
            .filter_map(|article| {
                let url = article.url.filter(|u| !u.is_empty())?;
                Some(ArticleRef {
                    url,
                    title: article.title,
                    publisher: article.source.and_then(|s| s.name),
                })
            })
            .collect();

        info!(
            count = refs.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Resolved article references"
        );
        debug!(urls = ?refs.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(), "Search results");

        Ok(refs)
    }
}
