//! # News Sentiment
//!
//! Searches NewsAPI for each term, digests every matching article, scores
//! the digests' sentiment and prints a JSON report.
//!
//! ## Usage
//!
//! ```sh
//! NEWSAPI_KEY=... news_sentiment --terms "tesla,nvidia" --pretty
//! ```
//!
//! Logs go to stderr; stdout carries only the report.

use clap::Parser;
use news_sentiment::cli::Cli;
use news_sentiment::nlp::HeuristicTagger;
use news_sentiment::outputs::json::{self, Report};
use news_sentiment::{
    ChatClassifier, ClassifierKind, Classifier, HttpArticleFetcher, LexiconClassifier, NewsApiClient,
    NewsError, Pipeline, PipelineConfig, SentimentStage,
};
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment starting up");

    let args = Cli::parse();
    debug!(terms = %args.terms, sources = %args.sources, "Parsed CLI arguments");

    // ---- Config ----
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).await?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    let settings = config.settings();
    info!(
        from_date = %settings.from_date,
        language = %settings.language,
        max_concurrency = ?settings.max_concurrency,
        call_timeout = ?settings.call_timeout,
        "Resolved settings"
    );

    // ---- Collaborators ----
    let api_key = config
        .newsapi_key
        .clone()
        .ok_or_else(|| NewsError::Config("NewsAPI key missing (set NEWSAPI_KEY or --newsapi-key)".to_string()))?;
    let search = NewsApiClient::new(
        api_key,
        config.newsapi_base_url.as_str(),
        &config.user_agent,
        config.request_timeout(),
    )?
    .with_page_size(config.page_size);
    let fetcher = HttpArticleFetcher::new(&config.user_agent, config.request_timeout())?;
    let pipeline = Pipeline::new(search, fetcher, HeuristicTagger, settings);
    let settings = pipeline.settings();

    // ---- Fetch ----
    let results = pipeline
        .fetch_terms(&args.terms, &args.sources)
        .await
        .inspect_err(|e| error!(error = %e, kind = ?e.kind(), "Fetch failed"))?;

    // ---- Classify ----
    let report = if args.no_classify {
        Report::from_terms(&results, settings)
    } else {
        let classifier: Box<dyn Classifier> = match config.classifier.kind {
            ClassifierKind::Lexicon => Box::new(LexiconClassifier::new()),
            ClassifierKind::Chat => Box::new(ChatClassifier::new(&config.classifier, config.request_timeout())?),
        };
        info!(kind = ?config.classifier.kind, "Classifying digests");
        let stage = SentimentStage::new(classifier).with_limits(settings.max_concurrency, settings.call_timeout);
        let predictions = stage
            .classify_terms(results)
            .await
            .inspect_err(|e| error!(error = %e, kind = ?e.kind(), "Classification failed"))?;
        Report::from_predictions(&predictions, settings)
    };

    // ---- Output ----
    match &args.output {
        Some(path) => json::write_report_file(&report, Path::new(path), args.pretty).await?,
        None => json::write_report(&report, std::io::stdout().lock(), args.pretty)?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        terms = report.terms.len(),
        articles = report.article_count(),
        "Execution complete"
    );

    Ok(())
}
