//! Usage accounting and cache statistics types.

use serde::{Deserialize, Serialize};

/// Process-lifetime usage counters.
///
/// Counters only increase; an explicit reset through the orchestrator is
/// the sole way to zero them. Token counts use the `len / 4` heuristic and
/// are an approximation, not authoritative for billing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Network attempts made, success or failure. Cache hits do not count.
    pub request_count: u64,
    /// Estimated input tokens across all successful calls.
    pub total_input_tokens: u64,
    /// Estimated output tokens across all successful calls.
    pub total_output_tokens: u64,
    /// Estimated spend in USD, from per-model $/Mtok rates.
    pub estimated_cost: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Logical requests that ended in a terminal error (one per call, not
    /// per attempt).
    pub failed_requests: u64,
}

/// Point-in-time view of the request cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Live entries currently held.
    pub size: usize,
    /// `hits / (hits + misses)`, or 0.0 before any lookup.
    pub hit_rate: f64,
}
