//! Model provider integrations for Sahayak.
//!
//! [`GeminiClient`] talks to the Gemini REST API. [`RateLimitedDriver`] and
//! [`RetryingDriver`] wrap any [`GenerativeDriver`](sahayak_interface::GenerativeDriver)
//! to add client-side quotas and retries for transient transport failures.

mod gemini;
mod rate_limited;
mod retry;

pub use gemini::{API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiClient};
pub use rate_limited::RateLimitedDriver;
pub use retry::RetryingDriver;
