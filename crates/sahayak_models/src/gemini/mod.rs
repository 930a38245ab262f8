//! Gemini REST API client.
//!
//! Uses `models/{model}:generateContent` with a JSON response schema so
//! structured answers arrive as JSON text.

mod client;
mod conversions;
mod dto;

pub use client::{API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiClient};
