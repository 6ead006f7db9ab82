//! Per-call request configuration and multimodal input types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-call configuration for a generation request.
///
/// Immutable value passed in by the caller; defaults suit product-mockup
/// image synthesis.
///
/// ```rust
/// # use mockmill::RequestConfig;
/// let config = RequestConfig::new("gemini-2.0-flash-exp")
///     .temperature(0.9)
///     .max_output_tokens(8192)
///     .max_retries(3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Provider model id.
    pub model: String,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Override for the orchestrator's retry budget. 0 = fail on first error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// System instruction prepended to the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Deadline for the whole call, including backoff sleeps. When it
    /// elapses the in-flight attempt is aborted, no further retries run,
    /// and the caller receives [`GenError::Cancelled`](crate::GenError::Cancelled).
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl RequestConfig {
    /// Create a config for the given model with defaults.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_output_tokens: None,
            max_retries: None,
            system_instruction: None,
            deadline: None,
        }
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A base64-encoded image attached to a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    /// MIME type of the encoded image.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl ImageInput {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Convenience constructor for PNG payloads.
    pub fn png(data: impl Into<String>) -> Self {
        Self::new("image/png", data)
    }
}
