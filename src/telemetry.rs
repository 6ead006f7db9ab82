//! Telemetry metric name constants.
//!
//! Centralised metric names for mockmill operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mockmill_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — "generate" or "variation"
//! - `status` — outcome: "ok" or "error"
//! - `direction` — token direction: "input" or "output"

/// Total network attempts dispatched to the provider.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "mockmill_requests_total";

/// Attempt duration in seconds.
///
/// Labels: `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "mockmill_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `operation`.
pub const RETRIES_TOTAL: &str = "mockmill_retries_total";

/// Total estimated tokens consumed.
///
/// Labels: `model`, `direction` ("input" | "output").
pub const TOKENS_TOTAL: &str = "mockmill_tokens_total";

/// Total request-cache hits.
pub const CACHE_HITS_TOTAL: &str = "mockmill_cache_hits_total";

/// Total request-cache misses.
pub const CACHE_MISSES_TOTAL: &str = "mockmill_cache_misses_total";
