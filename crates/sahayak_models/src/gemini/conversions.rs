//! Conversions between Sahayak request/response types and Gemini DTOs.

use super::dto::{
    GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig,
};
use sahayak_core::{
    FinishReason, GenerateRequest, GenerateResponse, Output, ResponseFormat, Role, TokenUsage,
};
use sahayak_error::{TransportError, TransportErrorKind};
use std::str::FromStr;

const JSON_MIME_TYPE: &str = "application/json";

fn role_name(role: &Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "model",
    }
}

/// Converts a Sahayak request into a Gemini request body.
pub fn to_gemini_request(req: &GenerateRequest) -> Result<GeminiRequest, TransportError> {
    let contents = req
        .messages()
        .iter()
        .map(|message| GeminiContent {
            role: Some(role_name(message.role()).to_string()),
            parts: vec![GeminiPart {
                text: Some(message.text().clone()),
            }],
        })
        .collect::<Vec<_>>();

    let system_instruction = req.system_instruction().as_ref().map(|text| GeminiContent {
        role: None,
        parts: vec![GeminiPart {
            text: Some(text.clone()),
        }],
    });

    let mut config = GenerationConfig::builder();
    if let Some(temperature) = req.temperature() {
        config.temperature(*temperature);
    }
    if let Some(max_tokens) = req.max_tokens() {
        config.max_output_tokens(*max_tokens);
    }
    if let Some(ResponseFormat::Json { schema }) = req.response_format() {
        config
            .response_mime_type(JSON_MIME_TYPE)
            .response_schema(schema.clone());
    }
    let config = config.build().map_err(|e| {
        TransportError::new(TransportErrorKind::ClientCreation(format!(
            "Failed to build generation config: {}",
            e
        )))
    })?;

    GeminiRequest::builder()
        .contents(contents)
        .system_instruction(system_instruction)
        .generation_config((!config.is_empty()).then_some(config))
        .build()
        .map_err(|e| {
            TransportError::new(TransportErrorKind::ClientCreation(format!(
                "Failed to build request: {}",
                e
            )))
        })
}

fn parse_finish_reason(raw: &str) -> FinishReason {
    FinishReason::from_str(raw).unwrap_or_else(|_| FinishReason::Other(raw.to_string()))
}

/// Converts a Gemini response body into a Sahayak response.
///
/// Only the first candidate is used. A response with no candidates is not
/// an error: it yields no outputs, with the prompt block reason (if any) as
/// the finish reason.
pub fn from_gemini_response(response: &GeminiResponse) -> GenerateResponse {
    let candidate = response.candidates.first();

    let outputs = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.clone())
                .map(Output::Text)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let finish_reason = candidate
        .and_then(|c| c.finish_reason.as_deref())
        .or_else(|| {
            response
                .prompt_feedback
                .as_ref()
                .and_then(|feedback| feedback.block_reason.as_deref())
        })
        .map(parse_finish_reason);

    let usage = response.usage_metadata.as_ref().map(|u| {
        let input = u.prompt_token_count.unwrap_or(0);
        let output = u.candidates_token_count.unwrap_or(0);
        TokenUsage::new(input, output, u.total_token_count.unwrap_or(input + output))
    });

    GenerateResponse::builder()
        .outputs(outputs)
        .finish_reason(finish_reason)
        .usage(usage)
        .build()
        .unwrap_or_default()
}
