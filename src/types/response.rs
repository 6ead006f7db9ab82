//! Parsed generation response.

use serde::{Deserialize, Serialize};

/// Parsed result of one successful generation call.
///
/// `text` concatenates all text fragments of the first candidate; `image`
/// holds the first inline image fragment as a `data:<mime>;base64,<data>`
/// URI, ready for direct rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Data-URI of the first generated image, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Provider finish reason (e.g. "STOP", "MAX_TOKENS", "SAFETY").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}
