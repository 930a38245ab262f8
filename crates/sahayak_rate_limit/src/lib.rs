//! Rate limiting for the Sahayak content generation library.
//!
//! Provider quotas are described by a [`RateLimitConfig`], usually taken
//! from a [`RateLimitTier`] preset, and enforced by a [`RateLimiter`].

mod config;
mod error;
mod limiter;

pub use config::{RateLimitConfig, RateLimitTier};
pub use error::{RateLimitError, RateLimitErrorKind};
pub use limiter::{RateLimiter, RateLimiterGuard};
