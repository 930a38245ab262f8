//! Live tests against the Gemini API.
//!
//! Require `GEMINI_API_KEY` and network access.
//!
//! Run with: cargo test --package sahayak_models --features api -- --ignored

#![cfg(feature = "api")]

use sahayak_core::{GenerateRequest, Message, ResponseFormat};
use sahayak_interface::GenerativeDriver;
use sahayak_models::GeminiClient;
use serde_json::json;

#[tokio::test]
#[ignore]
async fn structured_generation_returns_json() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let client = GeminiClient::from_env()?;

    let request = GenerateRequest::builder()
        .messages(vec![Message::user(
            "Translate 'good morning' into French (fr) and Hindi (hi).",
        )])
        .response_format(ResponseFormat::Json {
            schema: json!({
                "type": "OBJECT",
                "properties": {"fr": {"type": "STRING"}, "hi": {"type": "STRING"}},
                "required": ["fr", "hi"]
            }),
        })
        .build()?;

    let response = client.generate(&request).await?;
    let text = response.text().expect("model returned text");
    let value: serde_json::Value = serde_json::from_str(&text)?;

    assert!(value.get("fr").is_some_and(|v| v.is_string()));
    Ok(())
}

#[tokio::test]
#[ignore]
async fn invalid_key_is_a_permanent_error() -> anyhow::Result<()> {
    let client = GeminiClient::new("not-a-real-key")?;
    let request = GenerateRequest::builder()
        .messages(vec![Message::user("Hello")])
        .build()?;

    let err = client.generate(&request).await.unwrap_err();
    assert!(!sahayak_error::RetryableError::is_retryable(&err));
    Ok(())
}
