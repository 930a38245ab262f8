//! Error types for the Sahayak content generation library.
//!
//! Every error carries the source location where it was created. Two kinds
//! are genuine failures that callers must see: [`ValidationError`] (bad
//! input, raised before any model call) and [`TransportError`] (the model
//! call itself failed). Model emptiness is not an error and never appears
//! here.

mod config;
mod json;
mod template;
mod transport;
mod validation;

pub use config::ConfigError;
pub use json::JsonError;
pub use template::{TemplateError, TemplateErrorKind};
pub use transport::{RetryableError, TransportError, TransportErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum SahayakErrorKind {
    /// Caller input violated a declared constraint
    Validation(ValidationError),
    /// Model call could not complete
    Transport(TransportError),
    /// Prompt template failed to compile
    Template(TemplateError),
    /// Configuration error
    Config(ConfigError),
    /// JSON serialization/deserialization error
    Json(JsonError),
}

impl std::fmt::Display for SahayakErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SahayakErrorKind::Validation(e) => write!(f, "{}", e),
            SahayakErrorKind::Transport(e) => write!(f, "{}", e),
            SahayakErrorKind::Template(e) => write!(f, "{}", e),
            SahayakErrorKind::Config(e) => write!(f, "{}", e),
            SahayakErrorKind::Json(e) => write!(f, "{}", e),
        }
    }
}

/// Sahayak error with kind discrimination.
///
/// # Examples
///
/// ```
/// use sahayak_error::{SahayakError, SahayakErrorKind, ValidationError, ValidationErrorKind};
///
/// let err: SahayakError = ValidationError::new("languages", ValidationErrorKind::EmptyList).into();
/// assert!(matches!(err.kind(), SahayakErrorKind::Validation(_)));
/// assert_eq!(err.validation().map(|v| v.field.as_str()), Some("languages"));
/// ```
#[derive(Debug)]
pub struct SahayakError(Box<SahayakErrorKind>);

impl SahayakError {
    /// Create a new error from a kind.
    pub fn new(kind: SahayakErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &SahayakErrorKind {
        &self.0
    }

    /// The validation failure, if this is one.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self.kind() {
            SahayakErrorKind::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// The transport failure, if this is one.
    pub fn transport(&self) -> Option<&TransportError> {
        match self.kind() {
            SahayakErrorKind::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for SahayakError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sahayak Error: {}", self.0)
    }
}

impl std::error::Error for SahayakError {}

// Generic From implementation for any type that converts to SahayakErrorKind
impl<T> From<T> for SahayakError
where
    T: Into<SahayakErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Sahayak operations.
pub type SahayakResult<T> = std::result::Result<T, SahayakError>;
