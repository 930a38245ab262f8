//! Test helpers for driver wrapper tests.

use async_trait::async_trait;
use sahayak_core::{GenerateRequest, GenerateResponse, Message, Output};
use sahayak_error::{TransportError, TransportErrorKind};
use sahayak_interface::GenerativeDriver;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Driver that replays a fixed script of results and counts calls.
pub struct ScriptedDriver {
    script: Mutex<VecDeque<Result<GenerateResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedDriver {
    pub fn new(script: Vec<Result<GenerateResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeDriver for ScriptedDriver {
    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(text_response("{}")))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse::new(vec![Output::Text(text.to_string())])
}

pub fn http_error(status_code: u16) -> TransportError {
    TransportError::new(TransportErrorKind::HttpError {
        status_code,
        message: format!("status {}", status_code),
    })
}

pub fn request(prompt: &str) -> GenerateRequest {
    GenerateRequest::builder()
        .messages(vec![Message::user(prompt)])
        .build()
        .expect("valid test request")
}
