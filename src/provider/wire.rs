//! Wire types for the provider's `generateContent` endpoint.
//!
//! Mirrors the Gemini-style JSON shape: `contents[].parts[]` with `text`
//! or `inlineData` entries, a `generationConfig`, and an optional
//! `systemInstruction`. All field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::types::{GenResponse, ImageInput, RequestConfig};

/// Request body for one `generateContent` POST.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// Individual content part: text or an inline binary blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64-encoded binary payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Generation parameters forwarded to the provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Modalities the response may contain; image synthesis asks for both.
    pub response_modalities: Vec<String>,
}

/// Response body of a successful `generateContent` POST.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assemble the request body for one generation call.
pub fn build_request(
    prompt: &str,
    images: &[ImageInput],
    config: &RequestConfig,
) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: prompt.to_string(),
    }];
    for image in images {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        });
    }

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts,
        }],
        generation_config: Some(GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            response_modalities: vec!["TEXT".into(), "IMAGE".into()],
        }),
        system_instruction: config.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part::Text { text: text.clone() }],
        }),
    }
}

/// Parse a provider payload into a [`GenResponse`].
///
/// Concatenates all text fragments of the first candidate and captures the
/// first inline image fragment as a `data:<mime>;base64,<data>` URI. An
/// empty candidate list is an error.
pub fn parse_response(response: GenerateContentResponse) -> Result<GenResponse> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenError::Unknown {
            message: "provider returned no candidates".into(),
        })?;

    let mut text = String::new();
    let mut image = None;
    if let Some(content) = candidate.content {
        for part in content.parts {
            match part {
                Part::Text { text: fragment } => text.push_str(&fragment),
                Part::InlineData { inline_data } if image.is_none() => {
                    image = Some(format!(
                        "data:{};base64,{}",
                        inline_data.mime_type, inline_data.data
                    ));
                }
                Part::InlineData { .. } => {}
            }
        }
    }

    Ok(GenResponse {
        text: (!text.is_empty()).then_some(text),
        image,
        finish_reason: candidate.finish_reason,
    })
}
