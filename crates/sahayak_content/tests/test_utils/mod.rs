//! Mock driver for flow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sahayak_core::{FinishReason, GenerateRequest, GenerateResponse, Output};
use sahayak_error::TransportError;
use sahayak_interface::GenerativeDriver;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every call with the same response and remembers the prompts.
pub struct CannedDriver {
    response: GenerateResponse,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl CannedDriver {
    pub fn text(text: &str) -> Self {
        Self::response(GenerateResponse::new(vec![Output::Text(text.to_string())]))
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::text(&value.to_string())
    }

    pub fn refusal() -> Self {
        let mut builder = GenerateResponse::builder();
        builder.finish_reason(Some(FinishReason::Safety));
        Self::response(builder.build().unwrap())
    }

    pub fn response(response: GenerateResponse) -> Self {
        Self {
            response,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeDriver for CannedDriver {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = request.messages().first() {
            self.prompts.lock().unwrap().push(message.text().clone());
        }
        Ok(self.response.clone())
    }

    fn provider_name(&self) -> &'static str {
        "canned"
    }

    fn model_name(&self) -> &str {
        "canned-model"
    }
}
