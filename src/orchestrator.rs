//! Orchestrator façade: cache lookup, retry execution, usage accounting.
//!
//! [`Orchestrator`] mediates every call to the generative provider. Data
//! flow per request: compute cache key → cache lookup → on miss drive the
//! retry executor → parse the provider payload → record tokens → insert
//! into cache → return. All failures surface as typed [`GenError`] results;
//! no panic crosses this boundary.
//!
//! The orchestrator is an explicitly constructed service instance — inject
//! it into callers at startup rather than reaching for a global. It is safe
//! to share across tasks: the cache and usage tracker are the only mutable
//! state and both are internally locked, and network I/O and backoff sleeps
//! are the only suspension points.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::cache::{CacheConfig, RequestCache, cache_key};
use crate::error::{GenError, Result};
use crate::provider::{GenerateTransport, wire};
use crate::retry::{RetryConfig, with_retry};
use crate::telemetry;
use crate::types::{CacheStats, GenResponse, ImageInput, RequestConfig, UsageMetrics};
use crate::usage::{IMAGE_TOKEN_ALLOWANCE, UsageTracker, estimate_tokens};

/// Fixed camera/lighting directives appended to a base prompt to build
/// deterministic variants. Variant `i` uses directive `i % len`.
const VARIATION_DIRECTIVES: [&str; 4] = [
    "Straight-on studio shot, soft diffused lighting, neutral seamless background.",
    "Three-quarter angle, warm golden-hour lighting, shallow depth of field.",
    "Top-down flat lay, bright even lighting, minimal props.",
    "Low-angle close-up, dramatic side lighting, dark matte background.",
];

/// Default cap on concurrent in-flight variation sub-requests.
const DEFAULT_VARIATION_FANOUT: usize = 2;

/// Façade over cache, retry executor, and usage tracker.
///
/// ```rust,no_run
/// use mockmill::{Orchestrator, HttpTransport, StaticCredentials, RequestConfig};
///
/// #[tokio::main]
/// async fn main() -> mockmill::Result<()> {
///     let orchestrator = Orchestrator::builder(HttpTransport::new(
///         StaticCredentials::new("your-api-key"),
///     ))
///     .build();
///
///     let response = orchestrator
///         .request(
///             "Product mockup of a ceramic mug with a fern logo",
///             &[],
///             &RequestConfig::new("gemini-2.0-flash-exp").temperature(0.9),
///         )
///         .await?;
///
///     println!("{:?}", response.image);
///     Ok(())
/// }
/// ```
pub struct Orchestrator {
    transport: Arc<dyn GenerateTransport>,
    cache: RequestCache,
    usage: UsageTracker,
    retry: RetryConfig,
    fanout: Arc<Semaphore>,
}

impl Orchestrator {
    /// Create a builder around the given transport.
    pub fn builder(transport: impl GenerateTransport + 'static) -> OrchestratorBuilder {
        OrchestratorBuilder::new(transport)
    }

    /// Execute one generation request, consulting the cache first.
    ///
    /// A cache hit returns immediately with no network call. On a miss the
    /// retry executor drives the transport; a successful response is parsed,
    /// accounted, cached, and returned. A terminal failure increments
    /// `failed_requests` exactly once and surfaces the classified error.
    pub async fn request(
        &self,
        prompt: &str,
        images: &[ImageInput],
        config: &RequestConfig,
    ) -> Result<GenResponse> {
        self.with_deadline(config, self.request_uncancelled(prompt, images, config))
            .await
    }

    /// Issue `n` independent, uncached requests from one base prompt.
    ///
    /// Each variant appends a fixed camera/lighting directive to the base
    /// prompt, so every sub-request differs by design and the cache is
    /// deliberately bypassed. Fan-out is capped by a semaphore to respect
    /// the provider's rate limit. Partial failure is tolerated: whichever
    /// variants succeeded are returned, and an error surfaces only when
    /// **all** sub-requests fail.
    pub async fn generate_variations(
        &self,
        base_prompt: &str,
        image: &ImageInput,
        n: usize,
        config: &RequestConfig,
    ) -> Result<Vec<GenResponse>> {
        self.with_deadline(config, self.variations_uncancelled(base_prompt, image, n, config))
            .await
    }

    /// Read-only copy of the usage counters.
    pub fn usage_metrics(&self) -> UsageMetrics {
        self.usage.snapshot()
    }

    /// Zero all usage counters.
    pub fn reset_usage_metrics(&self) {
        self.usage.reset();
    }

    /// Empty the cache and reset cache-specific counters.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.usage.reset_cache_counters();
    }

    /// Point-in-time cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        let snapshot = self.usage.snapshot();
        let lookups = snapshot.cache_hits + snapshot.cache_misses;
        CacheStats {
            hits: snapshot.cache_hits,
            misses: snapshot.cache_misses,
            size: self.cache.len(),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                snapshot.cache_hits as f64 / lookups as f64
            },
        }
    }

    /// Apply the per-call deadline, if any. On expiry the in-flight attempt
    /// is dropped, no further retries run, and the call counts as failed.
    async fn with_deadline<T>(
        &self,
        config: &RequestConfig,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match config.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(result) => result,
                Err(_) => {
                    self.usage.record_failure();
                    Err(GenError::Cancelled)
                }
            },
            None => fut.await,
        }
    }

    async fn request_uncancelled(
        &self,
        prompt: &str,
        images: &[ImageInput],
        config: &RequestConfig,
    ) -> Result<GenResponse> {
        let key = cache_key(&config.model, prompt, images);
        if let Some(hit) = self.cache.get(key) {
            self.usage.record_cache_hit();
            debug!(key, "request served from cache");
            return Ok(hit);
        }
        self.usage.record_cache_miss();

        match self.execute(prompt, images, config, "generate").await {
            Ok(response) => {
                self.cache.insert(key, response.clone());
                Ok(response)
            }
            Err(e) => {
                self.usage.record_failure();
                Err(e)
            }
        }
    }

    async fn variations_uncancelled(
        &self,
        base_prompt: &str,
        image: &ImageInput,
        n: usize,
        config: &RequestConfig,
    ) -> Result<Vec<GenResponse>> {
        let images = std::slice::from_ref(image);
        let futures = (0..n).map(|i| {
            let directive = VARIATION_DIRECTIVES[i % VARIATION_DIRECTIVES.len()];
            let prompt = format!("{base_prompt} {directive}");
            async move {
                let _permit = self
                    .fanout
                    .acquire()
                    .await
                    .expect("fanout semaphore closed");
                self.execute(&prompt, images, config, "variation").await
            }
        });

        let mut successes = Vec::new();
        let mut last_err = None;
        for result in join_all(futures).await {
            match result {
                Ok(response) => successes.push(response),
                Err(e) => {
                    self.usage.record_failure();
                    last_err = Some(e);
                }
            }
        }

        match (successes.is_empty(), last_err) {
            (true, Some(e)) => Err(e),
            _ => Ok(successes),
        }
    }

    /// Drive one logical request through the retry executor and parse the
    /// result. Shared by `request` and variation fan-out; does not touch
    /// the cache.
    async fn execute(
        &self,
        prompt: &str,
        images: &[ImageInput],
        config: &RequestConfig,
        operation: &'static str,
    ) -> Result<GenResponse> {
        let body = wire::build_request(prompt, images, config);
        let retry = match config.max_retries {
            Some(n) => self.retry.clone().max_retries(n),
            None => self.retry.clone(),
        };

        let raw = with_retry(&retry, &self.usage, operation, || async {
            let start = Instant::now();
            let outcome = self.transport.generate(&config.model, &body).await;
            metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
                "operation" => operation)
            .record(start.elapsed().as_secs_f64());
            metrics::counter!(telemetry::REQUESTS_TOTAL,
                "operation" => operation,
                "status" => if outcome.is_ok() { "ok" } else { "error" })
            .increment(1);
            outcome
        })
        .await?;

        let parsed = wire::parse_response(raw)?;

        let mut input_tokens =
            estimate_tokens(prompt) + IMAGE_TOKEN_ALLOWANCE * images.len() as u64;
        if let Some(system) = &config.system_instruction {
            input_tokens += estimate_tokens(system);
        }
        let mut output_tokens = parsed.text.as_deref().map(estimate_tokens).unwrap_or(0);
        if parsed.image.is_some() {
            output_tokens += IMAGE_TOKEN_ALLOWANCE;
        }
        self.usage
            .record_tokens(&config.model, input_tokens, output_tokens);

        Ok(parsed)
    }
}

/// Builder for configuring an [`Orchestrator`].
pub struct OrchestratorBuilder {
    transport: Arc<dyn GenerateTransport>,
    cache: CacheConfig,
    retry: RetryConfig,
    variation_fanout: usize,
}

impl OrchestratorBuilder {
    pub fn new(transport: impl GenerateTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            variation_fanout: DEFAULT_VARIATION_FANOUT,
        }
    }

    /// Set the cache configuration.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Set the default retry configuration. Per-call `max_retries` in
    /// [`RequestConfig`] overrides the budget, not the delays.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Cap concurrent in-flight variation sub-requests. Default: 2.
    pub fn variation_fanout(mut self, n: usize) -> Self {
        self.variation_fanout = n.max(1);
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            transport: self.transport,
            cache: RequestCache::new(self.cache),
            usage: UsageTracker::new(),
            retry: self.retry,
            fanout: Arc::new(Semaphore::new(self.variation_fanout)),
        }
    }
}
