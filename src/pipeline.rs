//! Term fetch orchestration.
//!
//! [`Pipeline::fetch_terms`] fans a comma-delimited term list out to
//! [`Pipeline::fetch_term`], which resolves one term through the search
//! collaborator and processes every matching article concurrently.
//!
//! # Failure semantics
//!
//! Both levels join with [`try_join_all`]: results keep input order, and the
//! first error fails the whole call. A failing article fails its term, and a
//! failing term fails the batch; no partial result is ever returned.

use crate::concurrency::{Limiter, with_timeout};
use crate::config::PipelineSettings;
use crate::error::Result;
use crate::models::TermResult;
use crate::nlp::Tagger;
use crate::processor::ArticleProcessor;
use crate::scrapers::ArticleFetcher;
use crate::search::{SearchClient, SearchQuery};
use crate::utils::split_terms;
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Search → download → digest orchestrator.
pub struct Pipeline<S, F, T> {
    search: S,
    processor: ArticleProcessor<F, T>,
    settings: PipelineSettings,
    articles: Limiter,
}

impl<S, F, T> Pipeline<S, F, T>
where
    S: SearchClient,
    F: ArticleFetcher,
    T: Tagger + 'static,
{
    pub fn new(search: S, fetcher: F, tagger: T, settings: PipelineSettings) -> Self {
        let articles = Limiter::new(settings.max_concurrency, settings.call_timeout);
        Self {
            search,
            processor: ArticleProcessor::new(Arc::new(fetcher), Arc::new(tagger)),
            settings,
            articles,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Resolve one term and digest every matching article.
    ///
    /// Digests come back in the order the index returned their articles.
    ///
    /// # Errors
    ///
    /// Fails if the search fails or if any single article fails.
    #[instrument(level = "info", skip(self, sources))]
    pub async fn fetch_term(
        &self,
        term: &str,
        sources: &str,
        from_date: NaiveDate,
        language: &str,
    ) -> Result<TermResult> {
        let t0 = Instant::now();
        let query = SearchQuery {
            term: term.to_string(),
            sources: sources.to_string(),
            from_date,
            language: language.to_string(),
        };

        let refs = with_timeout("search", self.settings.call_timeout, self.search.search(&query))
            .await
            .inspect_err(|e| error!(error = %e, "Search failed"))?;
        info!(count = refs.len(), "Processing matching articles");

        let digests = try_join_all(
            refs.iter()
                .map(|article| self.articles.run("article", self.processor.process(article))),
        )
        .await
        .inspect_err(|e| error!(error = %e, "Article processing failed; dropping term"))?;

        info!(
            count = digests.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Term complete"
        );
        Ok(TermResult {
            term: term.to_string(),
            digests,
        })
    }

    /// Fetch every term of a comma-delimited list concurrently.
    ///
    /// Terms are taken literally (no trimming). The search window and
    /// language are the ones frozen into [`PipelineSettings`]. Results line
    /// up with the input terms regardless of completion order.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_terms(&self, terms: &str, sources: &str) -> Result<Vec<TermResult>> {
        let t0 = Instant::now();
        let from_date = self.settings.from_date;
        let language = self.settings.language.as_str();

        let results = try_join_all(
            split_terms(terms)
                .into_iter()
                .map(|term| self.fetch_term(term, sources, from_date, language)),
        )
        .await?;

        info!(
            terms = results.len(),
            digests = results.iter().map(|r| r.digests.len()).sum::<usize>(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched all terms"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, NewsError};
    use crate::nlp::HeuristicTagger;
    use crate::test_support::{FakeFetcher, FakeIndex, Step};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings::new(date(), "en")
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn fetcher_for(urls: &[&str]) -> FakeFetcher {
        urls.iter().fold(FakeFetcher::new(), |f, url| {
            f.with_body(url, &format!("Story from Reuters about {url}"))
        })
    }

    #[tokio::test]
    async fn fetch_term_queries_once_and_keeps_index_order() {
        let urls = ["https://a.com/1", "https://a.com/2", "https://a.com/3"];
        let index = FakeIndex::new().with_term("tesla", ms(0), &urls);
        let fetcher = fetcher_for(&urls)
            .with_delay(urls[0], ms(60))
            .with_delay(urls[1], ms(30));
        let pipeline = Pipeline::new(index, fetcher, HeuristicTagger, settings());

        let result = pipeline
            .fetch_term("tesla", "reuters", date(), "en")
            .await
            .unwrap();

        assert_eq!(result.term, "tesla");
        let got: Vec<&str> = result.digests.iter().map(|d| d.url()).collect();
        assert_eq!(got, urls);

        let queries = pipeline.search.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0], SearchQuery {
            term: "tesla".to_string(),
            sources: "reuters".to_string(),
            from_date: date(),
            language: "en".to_string(),
        });
    }

    #[test]
    fn pipeline_exposes_frozen_settings() {
        let frozen = settings().with_max_concurrency(Some(3));
        let pipeline = Pipeline::new(FakeIndex::new(), FakeFetcher::new(), HeuristicTagger, frozen.clone());
        assert_eq!(pipeline.settings(), &frozen);
    }

    #[tokio::test]
    async fn fetch_term_runs_articles_concurrently() {
        let urls = ["https://a.com/1", "https://a.com/2", "https://a.com/3", "https://a.com/4"];
        let index = FakeIndex::new().with_term("fed", ms(0), &urls);
        let fetcher = urls
            .iter()
            .fold(fetcher_for(&urls), |f, url| f.with_delay(url, ms(40)));
        let pipeline = Pipeline::new(index, fetcher, HeuristicTagger, settings());

        pipeline.fetch_term("fed", "", date(), "en").await.unwrap();

        assert_eq!(pipeline.processor_fetcher_peak(), 4);
    }

    #[tokio::test]
    async fn max_concurrency_bounds_in_flight_articles() {
        let urls = ["https://a.com/1", "https://a.com/2", "https://a.com/3", "https://a.com/4"];
        let index = FakeIndex::new().with_term("fed", ms(0), &urls);
        let fetcher = fetcher_for(&urls)
            .with_delay(urls[0], ms(40))
            .with_delay(urls[1], ms(30))
            .with_delay(urls[2], ms(20))
            .with_delay(urls[3], ms(10));
        let pipeline = Pipeline::new(
            index,
            fetcher,
            HeuristicTagger,
            settings().with_max_concurrency(Some(1)),
        );

        let result = pipeline.fetch_term("fed", "", date(), "en").await.unwrap();

        let got: Vec<&str> = result.digests.iter().map(|d| d.url()).collect();
        assert_eq!(got, urls);
        assert_eq!(pipeline.processor_fetcher_peak(), 1);
    }

    #[tokio::test]
    async fn bodiless_page_does_not_fail_the_term() {
        use crate::scrapers::HttpArticleFetcher;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><article><p>Tesla shares rose on Monday.</p></article></body></html>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/video"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body><video></video></body></html>"),
            )
            .mount(&server)
            .await;

        let story = format!("{}/story", server.uri());
        let video = format!("{}/video", server.uri());
        let index = FakeIndex::new().with_term("tesla", ms(0), &[story.as_str(), video.as_str()]);
        let fetcher = HttpArticleFetcher::new("news_sentiment-test", Duration::from_secs(5)).unwrap();
        let pipeline = Pipeline::new(index, fetcher, HeuristicTagger, settings());

        let result = pipeline.fetch_term("tesla", "", date(), "en").await.unwrap();

        assert_eq!(result.digests.len(), 2);
        assert_eq!(result.digests[0].text(), "Tesla shares rose on Monday.");
        assert_eq!(result.digests[1].url(), video);
        assert_eq!(result.digests[1].text(), "");
    }

    #[tokio::test]
    async fn one_failed_article_fails_the_term() {
        let urls = ["https://a.com/1", "https://a.com/2", "https://a.com/3"];
        let index = FakeIndex::new().with_term("oil", ms(0), &urls);
        let fetcher = fetcher_for(&urls).failing(urls[1], Step::Parse);
        let pipeline = Pipeline::new(index, fetcher, HeuristicTagger, settings());

        let result = pipeline.fetch_term("oil", "", date(), "en").await;

        match result {
            Err(err) => assert_eq!(err.kind(), ErrorKind::Parse),
            Ok(partial) => panic!("expected failure, got {} digests", partial.digests.len()),
        }
    }

    #[tokio::test]
    async fn search_failure_propagates_unmodified() {
        let index = FakeIndex::new().failing("gold");
        let pipeline = Pipeline::new(index, FakeFetcher::new(), HeuristicTagger, settings());

        let err = pipeline.fetch_term("gold", "", date(), "en").await.unwrap_err();
        assert!(matches!(err, NewsError::Fetch(ref m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn term_with_no_articles_is_empty() {
        let index = FakeIndex::new().with_term("nothing", ms(0), &[]);
        let pipeline = Pipeline::new(index, FakeFetcher::new(), HeuristicTagger, settings());

        let result = pipeline.fetch_term("nothing", "", date(), "en").await.unwrap();
        assert!(result.digests.is_empty());
    }

    #[tokio::test]
    async fn fetch_terms_keeps_input_order() {
        let index = FakeIndex::new()
            .with_term("a", ms(80), &["https://a.com/1"])
            .with_term("b", ms(0), &["https://b.com/1", "https://b.com/2"])
            .with_term("c", ms(40), &["https://c.com/1"]);
        let fetcher = fetcher_for(&["https://a.com/1", "https://b.com/1", "https://b.com/2", "https://c.com/1"]);
        let pipeline = Pipeline::new(index, fetcher, HeuristicTagger, settings());

        let results = pipeline.fetch_terms("a,b,c", "bbc-news").await.unwrap();

        let terms: Vec<&str> = results.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["a", "b", "c"]);
        assert_eq!(results[1].digests.len(), 2);
        assert_eq!(results[2].digests[0].url(), "https://c.com/1");
    }

    #[tokio::test]
    async fn fetch_terms_uses_frozen_defaults_and_literal_terms() {
        let index = FakeIndex::new()
            .with_term("apple", ms(0), &[])
            .with_term(" banana ", ms(0), &[]);
        let frozen = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let pipeline = Pipeline::new(
            index,
            FakeFetcher::new(),
            HeuristicTagger,
            PipelineSettings::new(frozen, "fr"),
        );

        let results = pipeline.fetch_terms("apple, banana ", "lemonde").await.unwrap();
        assert_eq!(results[1].term, " banana ");

        let queries = pipeline.search.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.from_date == frozen && q.language == "fr"));
        assert!(queries.iter().all(|q| q.sources == "lemonde"));
    }

    #[tokio::test]
    async fn one_failed_term_fails_the_batch() {
        let index = FakeIndex::new()
            .with_term("a", ms(0), &["https://a.com/1"])
            .failing("b");
        let pipeline = Pipeline::new(index, fetcher_for(&["https://a.com/1"]), HeuristicTagger, settings());

        let err = pipeline.fetch_terms("a,b", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn call_timeout_turns_hung_search_into_error() {
        let index = FakeIndex::new().with_term("slow", Duration::from_secs(10), &[]);
        let pipeline = Pipeline::new(
            index,
            FakeFetcher::new(),
            HeuristicTagger,
            settings().with_call_timeout(Some(ms(30))),
        );

        let err = pipeline.fetch_term("slow", "", date(), "en").await.unwrap_err();
        assert!(matches!(err, NewsError::Timeout { stage: "search", .. }));
    }

    #[tokio::test]
    async fn call_timeout_applies_per_article() {
        let index = FakeIndex::new().with_term("t", ms(0), &["https://a.com/1"]);
        let fetcher = fetcher_for(&["https://a.com/1"]).with_delay("https://a.com/1", Duration::from_secs(10));
        let pipeline = Pipeline::new(
            index,
            fetcher,
            HeuristicTagger,
            settings().with_call_timeout(Some(ms(30))),
        );

        let err = pipeline.fetch_term("t", "", date(), "en").await.unwrap_err();
        assert!(matches!(err, NewsError::Timeout { stage: "article", .. }));
    }

    impl<S, T> Pipeline<S, FakeFetcher, T> {
        fn processor_fetcher_peak(&self) -> usize {
            self.processor.fetcher().peak.load(Ordering::SeqCst)
        }
    }
}
