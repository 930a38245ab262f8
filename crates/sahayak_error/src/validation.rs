//! Request validation error types.

/// Why a request field was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Required field absent from the request
    MissingField,
    /// Required text field is empty after trimming whitespace
    BlankField,
    /// Field holds a value of the wrong JSON type
    TypeMismatch {
        /// Expected type name
        expected: &'static str,
        /// Type name actually received
        found: &'static str,
    },
    /// Numeric field lies outside its inclusive bounds
    OutOfRange {
        /// Value supplied by the caller
        value: f64,
        /// Inclusive lower bound, if declared
        min: Option<f64>,
        /// Inclusive upper bound, if declared
        max: Option<f64>,
    },
    /// Enum field holds a token outside the declared set
    NotAllowed {
        /// Value supplied by the caller
        value: String,
        /// Tokens the field accepts
        allowed: Vec<String>,
    },
    /// List field has no tokens left after splitting and trimming
    EmptyList,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorKind::MissingField => write!(f, "required field is missing"),
            ValidationErrorKind::BlankField => write!(f, "required field is blank"),
            ValidationErrorKind::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ValidationErrorKind::OutOfRange { value, min, max } => {
                let lower = min.map(|m| m.to_string()).unwrap_or_else(|| "-inf".into());
                let upper = max.map(|m| m.to_string()).unwrap_or_else(|| "inf".into());
                write!(f, "value {} is outside [{}, {}]", value, lower, upper)
            }
            ValidationErrorKind::NotAllowed { value, allowed } => write!(
                f,
                "'{}' is not one of [{}]",
                value,
                allowed.join(", ")
            ),
            ValidationErrorKind::EmptyList => write!(f, "list has no entries"),
        }
    }
}

/// Caller input violated a declared constraint.
///
/// Always identifies the failing field.
///
/// # Examples
///
/// ```
/// use sahayak_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new("topic", ValidationErrorKind::BlankField);
/// assert_eq!(err.field, "topic");
/// assert!(format!("{}", err).contains("topic"));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Name of the offending request field
    pub field: String,
    /// The specific violation
    pub kind: ValidationErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            field: field.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation Error: field '{}': {} at line {} in {}",
            self.field, self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ValidationError {}
