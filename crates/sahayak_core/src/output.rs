//! Output types from model responses.

use serde::{Deserialize, Serialize};

/// A piece of content returned by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Output {
    /// Plain text output. Structured answers usually arrive as JSON text.
    Text(String),

    /// Structured JSON output already decoded by the provider.
    Json(serde_json::Value),
}

impl Output {
    /// Whether this output carries nothing usable.
    pub fn is_blank(&self) -> bool {
        match self {
            Output::Text(text) => text.trim().is_empty(),
            Output::Json(value) => value.is_null(),
        }
    }
}
