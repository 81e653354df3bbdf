//! Chat-model sentiment classification with exponential backoff retry.
//!
//! The model is reached through an OpenAI-compatible
//! `/chat/completions` endpoint and asked for a JSON verdict.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining one async model round-trip
//! - [`ChatApi`]: reqwest implementation of [`AskAsync`]
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//! - [`ChatClassifier`]: Adapts the async round-trip to the blocking [`Classifier`] contract
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd
//! - A reply cut off mid-JSON is re-asked once

use super::Classifier;
use crate::config::ClassifierConfig;
use crate::error::{NewsError, Result};
use crate::models::Classification;
use crate::utils::{looks_truncated, truncate_for_log};
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

const SYSTEM_PROMPT: &str = "You are a news sentiment classifier. \
Read the article text and reply with a single JSON object of the form \
{\"label\": \"POSITIVE\" | \"NEGATIVE\" | \"NEUTRAL\", \"score\": <confidence between 0 and 1>}. \
Reply with the JSON object only.";

/// One async round-trip to a language model.
pub trait AskAsync {
    type Response;

    async fn ask(&self, text: &str) -> Result<Self::Response>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    /// Retries after the first failed attempt.
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt - 1).min(31) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client. Replies with the raw content of
/// the first choice.
pub struct ChatApi {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for ChatApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatApi")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatApi {
    pub fn new(config: &ClassifierConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl AskAsync for ChatApi {
    type Response = String;

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: 0.0,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response: ChatResponse = request.send().await?.error_for_status()?.json().await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| NewsError::Classification("chat reply had no content".to_string()))?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = content.len(),
            "Chat reply received"
        );
        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    label: String,
    score: f32,
}

/// Parse the JSON verdict out of a model reply.
///
/// Prose or code fences around the object are ignored.
fn parse_verdict(reply: &str) -> std::result::Result<Classification, serde_json::Error> {
    let json = match reply.find('{') {
        Some(start) => {
            let end = reply.rfind('}').filter(|end| *end > start).map_or(reply.len(), |end| end + 1);
            &reply[start..end]
        }
        None => reply.trim(),
    };
    let verdict: Verdict = serde_json::from_str(json)?;
    Ok(Classification {
        label: verdict.label.trim().to_uppercase(),
        score: verdict.score.clamp(0.0, 1.0),
    })
}

/// Sentiment classifier backed by a chat model.
///
/// [`Classifier::classify`] blocks the calling thread on the async request,
/// so it must run on the blocking pool (as
/// [`SentimentStage`](super::SentimentStage) does), never on a runtime
/// worker.
#[derive(Debug)]
pub struct ChatClassifier {
    api: RetryAsk<ChatApi>,
    handle: Handle,
}

impl ChatClassifier {
    /// Build a classifier bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails outside a runtime or if the HTTP client cannot be built.
    pub fn new(config: &ClassifierConfig, timeout: Duration) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| NewsError::Config(format!("chat classifier needs a tokio runtime: {e}")))?;
        let api = ChatApi::new(config, timeout)?;
        Ok(Self {
            api: RetryAsk::new(api, config.max_retries, Duration::from_secs(1)),
            handle,
        })
    }

    async fn classify_async(&self, text: &str) -> Result<Classification> {
        let reply = self.api.ask(text).await?;
        match parse_verdict(&reply) {
            Ok(verdict) => Ok(verdict),
            Err(e) if looks_truncated(&e) => {
                warn!(reply = %truncate_for_log(&reply, 200), "Truncated verdict; asking again");
                let reply = self.api.ask(text).await?;
                parse_verdict(&reply).map_err(|e| verdict_error(&reply, e))
            }
            Err(e) => Err(verdict_error(&reply, e)),
        }
    }
}

fn verdict_error(reply: &str, e: serde_json::Error) -> NewsError {
    NewsError::Classification(format!(
        "unreadable verdict ({e}): {}",
        truncate_for_log(reply, 200)
    ))
}

impl Classifier for ChatClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        self.handle.block_on(self.classify_async(text))
    }
}
