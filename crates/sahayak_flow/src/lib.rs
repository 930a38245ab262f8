//! Structured content generation with deterministic fallbacks.
//!
//! A flow turns a caller request into one model call and always returns a
//! complete value of its declared shape:
//!
//! 1. [`RequestSchema`] validates and normalizes the request.
//! 2. [`PromptTemplate`] renders the prompt from normalized values.
//! 3. [`StructuredInvoker`] sends it with a response schema derived from
//!    the flow's [`Shape`] and classifies the answer.
//! 4. [`Reconciler`] fills whatever the model left out with placeholders.
//!
//! Validation and transport failures are errors. An empty, unparseable or
//! misshapen answer is not; it is reconciled and logged.

mod flow;
mod invoker;
#[cfg(feature = "metrics")]
mod metrics;
mod normalizer;
mod reconciler;
mod runner;
mod shape;
mod template;

pub use flow::{ContentFlow, DerivedField, FlowSpec, VariantSource};
pub use invoker::{
    EmptyReason, GenerationResult, GenerationSettings, GenerationSettingsBuilder,
    StructuredInvoker, classify, extract_json,
};
#[cfg(feature = "metrics")]
pub use metrics::FlowMetrics;
pub use normalizer::{
    DEFAULT_LIST_DELIMITER, FieldKind, FieldSpec, NormalizedRequest, RawRequest, RequestSchema,
    json_type_name,
};
pub use reconciler::{
    FallbackEvent, KeyedContent, Reconcile, Reconciler, Variants, complete_items,
    placeholder_text,
};
pub use runner::{FlowOutcome, FlowRunner, to_raw};
pub use shape::{Property, Shape, ShapeMismatch};
pub use template::PromptTemplate;
