//! Core data types for the Sahayak content generation library.
//!
//! These types describe what crosses the boundary to a generative model:
//! requests, responses, and the observability setup shared by every binary.

mod message;
pub mod observability;
mod output;
mod request;
mod role;
mod token_usage;

pub use message::{Message, MessageBuilder};
pub use observability::{
    LogFormat, MetricsExporter, init_observability, init_tracing, shutdown_observability,
};
pub use output::Output;
pub use request::{
    FinishReason, GenerateRequest, GenerateRequestBuilder, GenerateResponse,
    GenerateResponseBuilder, ResponseFormat,
};
pub use role::Role;
pub use token_usage::TokenUsage;
