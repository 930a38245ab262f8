//! Model transport error types and retry classification.

/// Conditions under which a model call could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// API key not found in environment
    MissingApiKey(String),
    /// Failed to build the HTTP client
    ClientCreation(String),
    /// Connection-level failure (DNS, TLS, reset)
    Network(String),
    /// Request exceeded its deadline
    Timeout(String),
    /// HTTP error with status code and message
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Response body was not a valid provider envelope
    MalformedEnvelope(String),
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportErrorKind::MissingApiKey(var) => {
                write!(f, "{} environment variable not set", var)
            }
            TransportErrorKind::ClientCreation(msg) => {
                write!(f, "Failed to create model client: {}", msg)
            }
            TransportErrorKind::Network(msg) => write!(f, "Network failure: {}", msg),
            TransportErrorKind::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            TransportErrorKind::HttpError {
                status_code,
                message,
            } => write!(f, "HTTP {} error: {}", status_code, message),
            TransportErrorKind::MalformedEnvelope(msg) => {
                write!(f, "Malformed response envelope: {}", msg)
            }
        }
    }
}

impl TransportErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            TransportErrorKind::Network(_) => true,
            TransportErrorKind::Timeout(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            TransportErrorKind::HttpError { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            TransportErrorKind::Network(_) => (1000, 3, 10),
            TransportErrorKind::Timeout(_) => (2000, 3, 30),
            _ => (2000, 5, 60),
        }
    }
}

/// The underlying model call failed before producing a response.
///
/// Never converted into placeholder content.
///
/// # Examples
///
/// ```
/// use sahayak_error::{RetryableError, TransportError, TransportErrorKind};
///
/// let err = TransportError::new(TransportErrorKind::HttpError {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, _max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
#[derive(Debug, Clone)]
pub struct TransportError {
    /// The kind of error that occurred
    pub kind: TransportErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transport Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for TransportError {}

/// Trait for errors that support retry logic.
///
/// Lets a retrying wrapper decide whether an error is transient and how
/// aggressively to back off.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503, 429 or dropped connections return true.
    /// Permanent errors like 401 or 400 return false.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for TransportError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
