//! Request and response types for structured generation.

use crate::{Message, Output, TokenUsage};
use serde::{Deserialize, Serialize};

/// Requested format of the model answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Free text.
    Text,
    /// JSON conforming to the given schema (provider schema dialect).
    Json {
        /// Response schema
        schema: serde_json::Value,
    },
}

/// Generation request sent to a driver.
///
/// # Examples
///
/// ```
/// use sahayak_core::{GenerateRequest, Message};
///
/// let request = GenerateRequest::builder()
///     .messages(vec![Message::user("List three prime numbers")])
///     .temperature(0.2)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.temperature(), Some(0.2));
/// assert!(request.response_format().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct GenerateRequest {
    /// Conversation turns, oldest first
    #[builder(setter(into))]
    messages: Vec<Message>,
    /// System instruction placed ahead of the conversation
    #[builder(default, setter(into, strip_option))]
    system_instruction: Option<String>,
    /// Maximum tokens to generate
    #[builder(default, setter(strip_option))]
    max_tokens: Option<u32>,
    /// Sampling temperature
    #[builder(default, setter(strip_option))]
    temperature: Option<f32>,
    /// Model override; drivers fall back to their configured model
    #[builder(default, setter(into, strip_option))]
    model: Option<String>,
    /// Requested answer format
    #[builder(default, setter(strip_option))]
    response_format: Option<ResponseFormat>,
}

impl GenerateRequest {
    /// Returns a builder for constructing a GenerateRequest.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}

/// Why the model stopped producing output.
///
/// Parsed from provider strings such as `"STOP"` or `"SAFETY"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural end of the answer
    Stop,
    /// Output token budget exhausted
    MaxTokens,
    /// Blocked by safety filters
    Safety,
    /// Blocked for reciting training data
    Recitation,
    /// Blocked by a terminology blocklist
    Blocklist,
    /// Blocked as prohibited content
    ProhibitedContent,
    /// Blocked for sensitive personal information
    Spii,
    /// Provider-specific reason
    #[strum(default)]
    Other(String),
}

impl FinishReason {
    /// Whether the model declined to answer.
    pub fn is_refusal(&self) -> bool {
        !matches!(self, FinishReason::Stop | FinishReason::MaxTokens)
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "STOP"),
            FinishReason::MaxTokens => write!(f, "MAX_TOKENS"),
            FinishReason::Safety => write!(f, "SAFETY"),
            FinishReason::Recitation => write!(f, "RECITATION"),
            FinishReason::Blocklist => write!(f, "BLOCKLIST"),
            FinishReason::ProhibitedContent => write!(f, "PROHIBITED_CONTENT"),
            FinishReason::Spii => write!(f, "SPII"),
            FinishReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// The unified response object.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct GenerateResponse {
    /// Content parts, in provider order
    #[builder(default)]
    outputs: Vec<Output>,
    /// Why generation stopped, when the provider says
    #[builder(default)]
    finish_reason: Option<FinishReason>,
    /// Token accounting, when the provider reports it
    #[builder(default)]
    usage: Option<TokenUsage>,
}

impl GenerateResponse {
    /// Creates a response from outputs alone.
    pub fn new(outputs: Vec<Output>) -> Self {
        Self {
            outputs,
            finish_reason: None,
            usage: None,
        }
    }

    /// Creates a builder for GenerateResponse.
    pub fn builder() -> GenerateResponseBuilder {
        GenerateResponseBuilder::default()
    }

    /// Concatenated text of all text outputs, or `None` when there is none.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .outputs
            .iter()
            .filter_map(|output| match output {
                Output::Text(text) => Some(text.as_str()),
                Output::Json(_) => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.join(""))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn finish_reason_parses_provider_strings() {
        assert_eq!(FinishReason::from_str("STOP").unwrap(), FinishReason::Stop);
        assert_eq!(
            FinishReason::from_str("PROHIBITED_CONTENT").unwrap(),
            FinishReason::ProhibitedContent
        );
        assert_eq!(
            FinishReason::from_str("MALFORMED_FUNCTION_CALL").unwrap(),
            FinishReason::Other("MALFORMED_FUNCTION_CALL".to_string())
        );
    }

    #[test]
    fn refusals() {
        assert!(!FinishReason::Stop.is_refusal());
        assert!(!FinishReason::MaxTokens.is_refusal());
        assert!(FinishReason::Safety.is_refusal());
        assert!(FinishReason::Other("OTHER".into()).is_refusal());
    }

    #[test]
    fn text_joins_parts() {
        let response = GenerateResponse::new(vec![
            Output::Text("{\"a\":".into()),
            Output::Json(serde_json::json!({})),
            Output::Text(" 1}".into()),
        ]);
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
        assert_eq!(GenerateResponse::default().text(), None);
    }
}
