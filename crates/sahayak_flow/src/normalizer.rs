//! Request validation and normalization.
//!
//! A [`RequestSchema`] declares the parameters a flow accepts. Normalizing a
//! raw request checks every declared field and materializes list fields as
//! arrays of trimmed strings. Nothing here performs I/O.

use derive_getters::Getters;
use sahayak_error::{ValidationError, ValidationErrorKind};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Caller-supplied parameters, keyed by field name.
pub type RawRequest = Map<String, Value>;

/// Default separator for list fields supplied as a single string.
pub const DEFAULT_LIST_DELIMITER: char = ',';

/// Name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Type and constraint of one request field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text; required text must be non-blank
    Text,
    /// Any JSON number within inclusive bounds
    Number {
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
    },
    /// Whole number within inclusive bounds
    Integer {
        /// Inclusive lower bound
        min: Option<i64>,
        /// Inclusive upper bound
        max: Option<i64>,
    },
    /// One of a closed set of string tokens
    Enum(Vec<String>),
    /// Ordered tokens, given as a delimited string or an array of strings
    List {
        /// Separator used when the list arrives as one string
        delimiter: char,
    },
    /// Structured value passed through untouched
    Json,
}

/// Declaration of one request field.
///
/// # Examples
///
/// ```
/// use sahayak_flow::{FieldKind, FieldSpec};
///
/// let grade = FieldSpec::integer("gradeLevel", Some(1), Some(12));
/// assert!(grade.required());
///
/// let notes = FieldSpec::text("notes").optional();
/// assert!(!notes.required());
/// assert_eq!(notes.kind(), &FieldKind::Text);
/// ```
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct FieldSpec {
    /// Field name as it appears in the request
    name: String,
    /// Type and constraint
    kind: FieldKind,
    /// Whether the field must be present
    #[getter(skip)]
    required: bool,
}

impl FieldSpec {
    /// Declares a required field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    /// Required text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Required number with inclusive bounds.
    pub fn number(name: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(name, FieldKind::Number { min, max })
    }

    /// Required whole number with inclusive bounds.
    pub fn integer(name: impl Into<String>, min: Option<i64>, max: Option<i64>) -> Self {
        Self::new(name, FieldKind::Integer { min, max })
    }

    /// Required enum over the given tokens.
    pub fn one_of<I, S>(name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::Enum(allowed.into_iter().map(Into::into).collect()),
        )
    }

    /// Required comma-separated list.
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::List {
                delimiter: DEFAULT_LIST_DELIMITER,
            },
        )
    }

    /// Required structured value.
    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Json)
    }

    /// Marks the field optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Changes the separator of a list field. No effect on other kinds.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        if let FieldKind::List { delimiter: d } = &mut self.kind {
            *d = delimiter;
        }
        self
    }

    /// Whether the field must be present.
    pub fn required(&self) -> bool {
        self.required
    }

    fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(self.name.clone(), kind)
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> ValidationError {
        self.error(ValidationErrorKind::TypeMismatch {
            expected,
            found: json_type_name(found),
        })
    }

    /// Validates a present, non-null value and returns its normalized form.
    fn normalize_value(&self, value: &Value) -> Result<Value, ValidationError> {
        match &self.kind {
            FieldKind::Text => {
                let text = value.as_str().ok_or_else(|| self.mismatch("string", value))?;
                if self.required && text.trim().is_empty() {
                    return Err(self.error(ValidationErrorKind::BlankField));
                }
                Ok(value.clone())
            }
            FieldKind::Number { min, max } => {
                let number = value.as_f64().ok_or_else(|| self.mismatch("number", value))?;
                let below = min.is_some_and(|m| number < m);
                let above = max.is_some_and(|m| number > m);
                if below || above {
                    return Err(self.error(ValidationErrorKind::OutOfRange {
                        value: number,
                        min: *min,
                        max: *max,
                    }));
                }
                Ok(value.clone())
            }
            FieldKind::Integer { min, max } => {
                let number = as_integer(value).ok_or_else(|| self.mismatch("integer", value))?;
                let below = min.is_some_and(|m| number < m);
                let above = max.is_some_and(|m| number > m);
                if below || above {
                    return Err(self.error(ValidationErrorKind::OutOfRange {
                        value: number as f64,
                        min: min.map(|m| m as f64),
                        max: max.map(|m| m as f64),
                    }));
                }
                Ok(Value::from(number))
            }
            FieldKind::Enum(allowed) => {
                let token = value.as_str().ok_or_else(|| self.mismatch("string", value))?;
                if !allowed.iter().any(|a| a == token) {
                    return Err(self.error(ValidationErrorKind::NotAllowed {
                        value: token.to_string(),
                        allowed: allowed.clone(),
                    }));
                }
                Ok(value.clone())
            }
            FieldKind::List { delimiter } => {
                let tokens = self.list_tokens(value, *delimiter)?;
                if self.required && tokens.is_empty() {
                    return Err(self.error(ValidationErrorKind::EmptyList));
                }
                Ok(Value::Array(tokens.into_iter().map(Value::String).collect()))
            }
            FieldKind::Json => Ok(value.clone()),
        }
    }

    fn list_tokens(&self, value: &Value, delimiter: char) -> Result<Vec<String>, ValidationError> {
        let clean = |token: &str| {
            let token = token.trim();
            (!token.is_empty()).then(|| token.to_string())
        };

        match value {
            Value::String(text) => Ok(text.split(delimiter).filter_map(clean).collect()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(clean)
                        .ok_or_else(|| self.mismatch("list of strings", item))
                })
                .filter_map(Result::transpose)
                .collect(),
            other => Err(self.mismatch("list", other)),
        }
    }
}

/// Whole-number view of a JSON number; `4.0` counts, `4.5` does not.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Declared parameters of a flow.
///
/// # Examples
///
/// ```
/// use sahayak_flow::{FieldSpec, RequestSchema};
/// use serde_json::json;
///
/// let schema = RequestSchema::new(vec![
///     FieldSpec::text("prompt"),
///     FieldSpec::list("languages"),
/// ]);
///
/// let raw = json!({"prompt": "Water cycle", "languages": "en, hi ,,fr"});
/// let normalized = schema.normalize(raw.as_object().unwrap()).unwrap();
///
/// assert_eq!(normalized.list("languages"), Some(vec!["en", "hi", "fr"]));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Getters)]
pub struct RequestSchema {
    /// Field declarations in validation order
    fields: Vec<FieldSpec>,
}

impl RequestSchema {
    /// Creates a schema from field declarations.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Looks up a field declaration by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Validates `raw` and returns its normalized form.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// returned. Undeclared fields pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the offending field.
    #[instrument(skip_all, fields(fields = self.fields.len()))]
    pub fn normalize(&self, raw: &RawRequest) -> Result<NormalizedRequest, ValidationError> {
        let mut normalized = raw.clone();

        for spec in &self.fields {
            match raw.get(spec.name()) {
                None | Some(Value::Null) if spec.required() => {
                    return Err(spec.error(ValidationErrorKind::MissingField));
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    let value = spec.normalize_value(value)?;
                    normalized.insert(spec.name().clone(), value);
                }
            }
        }

        debug!("Request normalized");
        Ok(NormalizedRequest(normalized))
    }
}

/// A request that passed validation.
///
/// List fields hold arrays of non-empty trimmed strings in caller order,
/// duplicates included.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedRequest(Map<String, Value>);

impl NormalizedRequest {
    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Text value of a field.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Numeric value of a field.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// List value of a field.
    pub fn list(&self, field: &str) -> Option<Vec<&str>> {
        self.get(field)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Field value rendered as display text, for logs and placeholders.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            other => Some(other.to_string()),
        }
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into a raw request, e.g. to normalize again.
    pub fn into_raw(self) -> RawRequest {
        self.0
    }

    /// The request as a JSON object, the root of template rendering.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
