//! Mockmill error types and provider error classification.
//!
//! Every failure the orchestrator can surface is a [`GenError`]. Errors are
//! classified status-first, falling back to message inspection only for
//! provider-specific signals (safety blocks, capacity notices) that have no
//! dedicated status code. Each kind carries a fixed remediation string the
//! caller can render directly.

use std::time::Duration;

/// Mockmill error taxonomy.
///
/// Transient kinds ([`RateLimited`](GenError::RateLimited),
/// [`ServiceOverloaded`](GenError::ServiceOverloaded)) are retried internally;
/// everything else is terminal and returned without retry.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenError {
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("service overloaded")]
    ServiceOverloaded,

    #[error("authentication failed")]
    Unauthorized,

    #[error("content blocked: {reason}")]
    ContentBlocked { reason: String },

    /// Caller-supplied deadline elapsed; the in-flight attempt was aborted
    /// and no further retries were made.
    #[error("request cancelled")]
    Cancelled,

    #[error("generation failed: {message}")]
    Unknown { message: String },
}

impl GenError {
    /// Classify a provider failure into the error taxonomy.
    ///
    /// Status code wins when present; the raw message is consulted only as a
    /// fallback, since provider error text varies by locale and format.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        match status {
            Some(429) => GenError::RateLimited { retry_after: None },
            Some(503) => GenError::ServiceOverloaded,
            Some(401) | Some(403) => GenError::Unauthorized,
            _ => {
                let lower = message.to_lowercase();
                if lower.contains("safety") || lower.contains("blocked") {
                    GenError::ContentBlocked {
                        reason: message.to_string(),
                    }
                } else if lower.contains("overloaded") || lower.contains("capacity") {
                    GenError::ServiceOverloaded
                } else if lower.contains("authentication") {
                    GenError::Unauthorized
                } else {
                    GenError::Unknown {
                        message: message.to_string(),
                    }
                }
            }
        }
    }

    /// Whether retrying could change the outcome.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenError::RateLimited { .. } | GenError::ServiceOverloaded
        )
    }

    /// Provider `retry-after` hint, if one was supplied.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Fixed, user-facing remediation hint for this error kind.
    pub fn remediation(&self) -> &'static str {
        match self {
            GenError::RateLimited { .. } => "Too many requests. Wait a moment and retry.",
            GenError::ServiceOverloaded => {
                "The generation service is over capacity. Try again shortly."
            }
            GenError::Unauthorized => "The API key is missing or invalid. Check your credentials.",
            GenError::ContentBlocked { .. } => {
                "The prompt or image was blocked by the provider's safety filters. Rephrase and retry."
            }
            GenError::Cancelled => "The request was cancelled before it completed.",
            GenError::Unknown { .. } => "Generation failed unexpectedly. Retry or simplify the prompt.",
        }
    }
}

/// Result type alias for mockmill operations.
pub type Result<T> = std::result::Result<T, GenError>;
