//! Token usage reported by a provider.

use serde::{Deserialize, Serialize};

/// Token usage information for a completed generation.
///
/// # Examples
///
/// ```
/// use sahayak_core::TokenUsage;
///
/// let usage = TokenUsage::new(150, 50, 200);
/// assert_eq!(usage.input_tokens(), 150);
/// assert_eq!(usage.total_tokens(), 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    input_tokens: u64,
    output_tokens: u64,
    total_tokens: u64,
}

impl TokenUsage {
    /// Creates new token usage data.
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Number of tokens in the prompt.
    pub fn input_tokens(&self) -> u64 {
        self.input_tokens
    }

    /// Number of tokens in the generated output.
    pub fn output_tokens(&self) -> u64 {
        self.output_tokens
    }

    /// Total tokens billed by the provider.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }
}
