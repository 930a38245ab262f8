//! Wire types for the Gemini `generateContent` endpoint.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One text part of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Part text; absent for non-text parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A turn of conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiContent {
    /// "user" or "model"; omitted for system instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Sampling and output controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Builder, Getters)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(strip_option))]
pub struct GenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    /// MIME type of the answer, `application/json` for structured output
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    response_mime_type: Option<String>,
    /// OpenAPI-subset schema the answer must follow
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

impl GenerationConfig {
    /// Creates a new builder for GenerationConfig.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    /// Whether every field is unset.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Builder, Getters)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GeminiRequest {
    /// Conversation turns
    contents: Vec<GeminiContent>,
    /// System instruction
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    /// Generation controls
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GeminiRequest {
    /// Creates a new builder for GeminiRequest.
    pub fn builder() -> GeminiRequestBuilder {
        GeminiRequestBuilder::default()
    }
}

/// One candidate answer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Answer content; absent when the candidate was blocked
    #[serde(default)]
    pub content: Option<GeminiContent>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was blocked outright
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token accounting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    /// Tokens across all candidates
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
    /// Total billed tokens
    #[serde(default)]
    pub total_token_count: Option<u64>,
}

/// `generateContent` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Candidate answers; empty when the prompt was blocked
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Prompt-level feedback
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    /// Token usage
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorEnvelope {
    /// Error details
    pub error: GeminiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorBody {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Canonical status, e.g. `RESOURCE_EXHAUSTED`
    #[serde(default)]
    pub status: Option<String>,
}
