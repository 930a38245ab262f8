//! Shared fixtures for flow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sahayak_core::{GenerateRequest, GenerateResponse, Output};
use sahayak_error::{TransportError, TransportErrorKind};
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, KeyedContent, RequestSchema, Shape, VariantSource,
};
use sahayak_interface::GenerativeDriver;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Driver that replays canned answers, counts calls and keeps requests.
pub struct MockDriver {
    answers: Mutex<VecDeque<Result<GenerateResponse, TransportError>>>,
    fallback: Result<GenerateResponse, TransportError>,
    requests: Mutex<Vec<GenerateRequest>>,
    calls: AtomicUsize,
}

impl MockDriver {
    /// Always answers with `text`.
    pub fn answering(text: &str) -> Self {
        Self::scripted(Vec::new(), Ok(text_response(text)))
    }

    /// Always fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::scripted(Vec::new(), Err(error))
    }

    pub fn scripted(
        answers: Vec<Result<GenerateResponse, TransportError>>,
        fallback: Result<GenerateResponse, TransportError>,
    ) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt text of the most recent request.
    pub fn last_prompt(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.messages().first().map(|m| m.text().clone()))
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerativeDriver for MockDriver {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.answers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse::new(vec![Output::Text(text.to_string())])
}

pub fn timeout() -> TransportError {
    TransportError::new(TransportErrorKind::Timeout("deadline elapsed".into()))
}

/// Keyed translation flow used across tests.
pub struct TranslateFlow {
    spec: FlowSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslateInput {
    pub prompt: String,
    pub languages: Vec<String>,
}

impl TranslateFlow {
    pub fn new() -> Self {
        let spec = FlowSpec::new(
            "test_translate",
            "Write about {{prompt}} in: {{#each languages}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}",
            RequestSchema::new(vec![FieldSpec::text("prompt"), FieldSpec::list("languages")]),
            Shape::Keyed,
            VariantSource::Keys("languages"),
            "Translation",
        )
        .expect("valid template")
        .identified_by(&["prompt"]);
        Self { spec }
    }
}

impl ContentFlow for TranslateFlow {
    type Input = TranslateInput;
    type Output = KeyedContent;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Flow with an inclusive integer bound.
pub fn bounded_spec() -> FlowSpec {
    FlowSpec::new(
        "test_bounded",
        "Write {{count}} items about {{topic}}",
        RequestSchema::new(vec![
            FieldSpec::text("topic"),
            FieldSpec::integer("count", Some(1), Some(10)),
        ]),
        Shape::Keyed,
        VariantSource::Items("count"),
        "Item",
    )
    .expect("valid template")
}
