//! Usage accounting and cost estimation.
//!
//! [`UsageTracker`] accumulates request counts, token estimates, estimated
//! spend, and cache hit/miss/failure counters for the lifetime of an
//! orchestrator instance. Token counts use the `len / 4` heuristic plus a
//! fixed per-image allowance; they are a rough *estimate* only — actual
//! provider-billed token counts may differ materially.

use std::sync::Mutex;

use crate::telemetry;
use crate::types::UsageMetrics;

/// Tokens charged per image input, regardless of resolution.
pub const IMAGE_TOKEN_ALLOWANCE: u64 = 500;

/// Per-model pricing in USD per million tokens: `(input, output)`.
///
/// Unknown models fall back to the flash-tier rates.
fn model_rates(model: &str) -> (f64, f64) {
    if model.contains("pro") {
        (1.25, 5.0)
    } else {
        // flash tier, also the default
        (0.075, 0.30)
    }
}

/// Estimate the token count of a text blob.
///
/// `ceil(len / 4)` — the conventional rough average of four characters per
/// token. Not authoritative for billing.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.len() as u64).div_ceil(4)
}

/// Mutex-guarded process-lifetime usage counters.
///
/// Shared mutable state: variation fan-out and independent requests record
/// concurrently. The lock is never held across an await point.
pub struct UsageTracker {
    metrics: Mutex<UsageMetrics>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            metrics: Mutex::new(UsageMetrics::default()),
        }
    }

    /// Record one network attempt, success or failure.
    pub fn record_attempt(&self) {
        self.lock().request_count += 1;
    }

    pub fn record_cache_hit(&self) {
        self.lock().cache_hits += 1;
    }

    pub fn record_cache_miss(&self) {
        self.lock().cache_misses += 1;
    }

    /// Record one logical request ending in a terminal error.
    pub fn record_failure(&self) {
        self.lock().failed_requests += 1;
    }

    /// Accumulate token estimates and cost for a successful call.
    pub fn record_tokens(&self, model: &str, input_tokens: u64, output_tokens: u64) {
        let (input_rate, output_rate) = model_rates(model);
        let cost = (input_tokens as f64 / 1_000_000.0) * input_rate
            + (output_tokens as f64 / 1_000_000.0) * output_rate;

        metrics::counter!(telemetry::TOKENS_TOTAL,
            "model" => model.to_owned(), "direction" => "input")
        .increment(input_tokens);
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "model" => model.to_owned(), "direction" => "output")
        .increment(output_tokens);

        let mut m = self.lock();
        m.total_input_tokens += input_tokens;
        m.total_output_tokens += output_tokens;
        m.estimated_cost += cost;
    }

    /// Read-only copy of the current counters.
    pub fn snapshot(&self) -> UsageMetrics {
        self.lock().clone()
    }

    /// Zero all counters.
    pub fn reset(&self) {
        *self.lock() = UsageMetrics::default();
    }

    /// Zero only the cache counters; used by `clear_cache()`.
    pub fn reset_cache_counters(&self) {
        let mut m = self.lock();
        m.cache_hits = 0;
        m.cache_misses = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UsageMetrics> {
        self.metrics.lock().expect("usage lock poisoned")
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn flash_rates_are_default() {
        let tracker = UsageTracker::new();
        tracker.record_tokens("gemini-2.0-flash-exp", 1_000_000, 1_000_000);
        let snapshot = tracker.snapshot();
        assert!((snapshot.estimated_cost - 0.375).abs() < 1e-9);
    }

    #[test]
    fn pro_models_use_pro_rates() {
        let tracker = UsageTracker::new();
        tracker.record_tokens("gemini-1.5-pro", 1_000_000, 0);
        assert!((tracker.snapshot().estimated_cost - 1.25).abs() < 1e-9);
    }

    #[test]
    fn reset_cache_counters_leaves_the_rest() {
        let tracker = UsageTracker::new();
        tracker.record_attempt();
        tracker.record_cache_hit();
        tracker.record_cache_miss();
        tracker.reset_cache_counters();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(snapshot.cache_misses, 0);
        assert_eq!(snapshot.request_count, 1);
    }
}
