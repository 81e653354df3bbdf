//! Article processing: one [`ArticleRef`] in, one [`Digest`] out.

use crate::error::Result;
use crate::models::{ArticleRef, DIGEST_TOKEN_LIMIT, Digest};
use crate::nlp::{Tagger, extract_entities};
use crate::scrapers::ArticleFetcher;
use crate::utils::truncate_tokens;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

/// Drives the fetch/parse collaborator and assembles digests.
///
/// The download is awaited on the async side. Parsing, NLP derivation,
/// truncation and entity extraction run together as one job on the
/// blocking pool.
pub struct ArticleProcessor<F, T> {
    fetcher: Arc<F>,
    tagger: Arc<T>,
}

impl<F, T> Clone for ArticleProcessor<F, T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            tagger: Arc::clone(&self.tagger),
        }
    }
}

impl<F, T> ArticleProcessor<F, T> {
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F, T> ArticleProcessor<F, T>
where
    F: ArticleFetcher,
    T: Tagger + 'static,
{
    pub fn new(fetcher: Arc<F>, tagger: Arc<T>) -> Self {
        Self { fetcher, tagger }
    }

    /// Download, parse and digest one article.
    ///
    /// # Errors
    ///
    /// Fails with the first error of any step. No digest is produced for a
    /// failed article.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            url = %article.url,
            title = article.title.as_deref(),
            publisher = article.publisher.as_deref()
        )
    )]
    pub async fn process(&self, article: &ArticleRef) -> Result<Digest> {
        let t0 = Instant::now();
        let html = self.fetcher.download(article).await?;

        let fetcher = Arc::clone(&self.fetcher);
        let tagger = Arc::clone(&self.tagger);
        let url = article.url.clone();
        let digest =
            tokio::task::spawn_blocking(move || build_digest(fetcher.as_ref(), tagger.as_ref(), url, html))
                .await??;

        debug!(
            ners = digest.ners().len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Built digest"
        );
        Ok(digest)
    }
}

/// The CPU-bound half of [`ArticleProcessor::process`].
pub fn build_digest<F, T>(fetcher: &F, tagger: &T, url: String, html: String) -> Result<Digest>
where
    F: ArticleFetcher,
    T: Tagger + ?Sized,
{
    let parsed = fetcher.parse(&url, html)?;
    let nlp = fetcher.nlp(&parsed)?;
    let text = truncate_tokens(&parsed.text, DIGEST_TOKEN_LIMIT);
    let ners = extract_entities(&text, tagger)?;
    Ok(Digest::assemble(url, parsed, nlp, text, ners))
}
