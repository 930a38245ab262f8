//! Sahayak: localized teaching content from Gemini, always complete.
//!
//! Every flow validates its request, sends one structured call, and returns
//! a value of its declared shape. Anything the model leaves out is filled
//! with a deterministic placeholder such as
//! `"Translation not available for fr"`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sahayak::{MultiLanguageFlow, MultiLanguageRequest, SahayakConfig};
//!
//! let runner = SahayakConfig::load()?.runner()?;
//! let request = MultiLanguageRequest::builder()
//!     .prompt("The water cycle")
//!     .languages(vec!["en".into(), "hi".into(), "ta".into()])
//!     .build()?;
//! let content = runner.run(&MultiLanguageFlow::new()?, &request).await?;
//! ```

mod config;

pub use config::{CONFIG_FILE_NAME, ENV_PREFIX, SahayakConfig, SahayakDriver};

pub use sahayak_content::*;
pub use sahayak_core::{
    FinishReason, GenerateRequest, GenerateResponse, LogFormat, Message, Output, ResponseFormat,
    Role, TokenUsage, init_observability, init_tracing, shutdown_observability,
};
pub use sahayak_error::*;
pub use sahayak_flow::*;
pub use sahayak_interface::GenerativeDriver;
pub use sahayak_models::{
    API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, RateLimitedDriver, RetryingDriver,
};
pub use sahayak_rate_limit::{RateLimitConfig, RateLimitTier, RateLimiter};
