//! Sentiment classification of digests.
//!
//! [`SentimentStage`] fans a collection of digests out to a [`Classifier`],
//! one blocking-pool job per digest, and pairs each digest with its label.
//! The classifier always sees the digest's truncated body
//! ([`Digest::text`]), never its summary.
//!
//! # Backends
//!
//! - [`lexicon`]: Local word-weight lexicon, no I/O
//! - [`chat`]: OpenAI-compatible chat completion endpoint with retry/backoff

pub mod chat;
pub mod lexicon;

pub use chat::{ChatClassifier, RetryAsk};
pub use lexicon::LexiconClassifier;

use crate::concurrency::Limiter;
use crate::error::Result;
use crate::models::{Classification, ClassifiedDigest, Digest, Prediction, TermResult};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// A sentiment model: text in, label and confidence out.
///
/// Calls may block for a long time (CPU/GPU inference or a remote model);
/// [`SentimentStage`] always invokes them on the blocking pool.
pub trait Classifier: Send + Sync + 'static {
    fn classify(&self, text: &str) -> Result<Classification>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, text: &str) -> Result<Classification> {
        (**self).classify(text)
    }
}

/// Concurrent classification orchestrator.
pub struct SentimentStage<C> {
    classifier: Arc<C>,
    limiter: Limiter,
}

impl<C: Classifier> SentimentStage<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            classifier: Arc::new(classifier),
            limiter: Limiter::default(),
        }
    }

    /// Bound in-flight classifier jobs and time out each one.
    pub fn with_limits(mut self, max_concurrency: Option<usize>, call_timeout: Option<Duration>) -> Self {
        self.limiter = Limiter::new(max_concurrency, call_timeout);
        self
    }

    async fn classify_one(&self, digest: Digest) -> Result<ClassifiedDigest> {
        let classifier = Arc::clone(&self.classifier);
        self.limiter
            .run("classify", async move {
                let text = digest.text().to_string();
                let label = tokio::task::spawn_blocking(move || classifier.classify(&text)).await??;
                Ok((digest, label))
            })
            .await
    }

    /// Classify every digest concurrently.
    ///
    /// Pairs come back in input order. The first classifier failure fails
    /// the whole call.
    #[instrument(level = "info", skip_all, fields(count = digests.len()))]
    pub async fn classify_all(&self, digests: Vec<Digest>) -> Result<Vec<ClassifiedDigest>> {
        let t0 = Instant::now();
        let pairs = try_join_all(digests.into_iter().map(|digest| self.classify_one(digest)))
            .await
            .inspect_err(|e| error!(error = %e, "Classification batch failed"))?;

        info!(
            count = pairs.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Classified digests"
        );
        Ok(pairs)
    }

    /// Classify the digests of every term, keeping term order.
    #[instrument(level = "info", skip_all, fields(terms = results.len()))]
    pub async fn classify_terms(&self, results: Vec<TermResult>) -> Result<Vec<Prediction>> {
        try_join_all(results.into_iter().map(|result| async move {
            let results = self.classify_all(result.digests).await?;
            Ok(Prediction {
                term: result.term,
                results,
            })
        }))
        .await
    }
}
