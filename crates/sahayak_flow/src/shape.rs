//! Declared output shapes.
//!
//! A [`Shape`] describes the JSON a flow expects back. It is rendered as the
//! provider's `responseSchema` and used to check what the model returned.

use crate::Variants;
use derive_getters::Getters;
use serde_json::{Map, Value, json};

/// Expected structure of a model answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// JSON string
    String,
    /// Any JSON number
    Number,
    /// Whole number
    Integer,
    /// JSON boolean
    Boolean,
    /// String drawn from a closed set
    Enum(Vec<String>),
    /// Homogeneous array
    Array(Box<Shape>),
    /// Object with named properties
    Object(Vec<Property>),
    /// Object mapping each requested variant key to a string
    Keyed,
}

/// One named property of an object shape.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Property {
    /// Property name
    name: String,
    /// Property shape
    shape: Shape,
    /// Whether the property must be present
    #[getter(skip)]
    required: bool,
    /// Hint passed to the model
    description: Option<String>,
}

impl Property {
    /// Required property.
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
            description: None,
        }
    }

    /// Marks the property optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attaches a description for the model.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the property must be present.
    pub fn required(&self) -> bool {
        self.required
    }
}

/// Why a value does not fit a shape.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("expected {} at {}", expected, path)]
pub struct ShapeMismatch {
    /// JSON pointer-like location of the offending value
    pub path: String,
    /// What the shape wanted there
    pub expected: String,
}

impl ShapeMismatch {
    fn new(path: &str, expected: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() { "$".to_string() } else { path.to_string() },
            expected: expected.into(),
        }
    }
}

impl Shape {
    /// Array of the given item shape.
    pub fn array(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    /// Array of strings.
    pub fn strings() -> Self {
        Shape::array(Shape::String)
    }

    /// Object with the given properties.
    pub fn object(properties: impl IntoIterator<Item = Property>) -> Self {
        Shape::Object(properties.into_iter().collect())
    }

    /// Enum over the given tokens.
    pub fn one_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Shape::Enum(tokens.into_iter().map(Into::into).collect())
    }

    /// Renders the shape in the Gemini schema dialect (an OpenAPI subset).
    ///
    /// Keyed shapes expand to one required string property per distinct
    /// variant key.
    ///
    /// # Examples
    ///
    /// ```
    /// use sahayak_flow::{Shape, Variants};
    /// use serde_json::json;
    ///
    /// let variants = Variants::keys(["en", "fr"]);
    /// assert_eq!(
    ///     Shape::Keyed.to_response_schema(&variants),
    ///     json!({
    ///         "type": "OBJECT",
    ///         "properties": {"en": {"type": "STRING"}, "fr": {"type": "STRING"}},
    ///         "required": ["en", "fr"],
    ///         "propertyOrdering": ["en", "fr"]
    ///     })
    /// );
    /// ```
    pub fn to_response_schema(&self, variants: &Variants) -> Value {
        match self {
            Shape::String => json!({"type": "STRING"}),
            Shape::Number => json!({"type": "NUMBER"}),
            Shape::Integer => json!({"type": "INTEGER"}),
            Shape::Boolean => json!({"type": "BOOLEAN"}),
            Shape::Enum(tokens) => json!({"type": "STRING", "enum": tokens}),
            Shape::Array(item) => json!({
                "type": "ARRAY",
                "items": item.to_response_schema(variants)
            }),
            Shape::Object(properties) => {
                let mut props = Map::new();
                for property in properties {
                    let mut schema = property.shape.to_response_schema(variants);
                    if let (Some(description), Value::Object(map)) =
                        (&property.description, &mut schema)
                    {
                        map.insert("description".into(), Value::String(description.clone()));
                    }
                    props.insert(property.name.clone(), schema);
                }
                let required: Vec<&str> = properties
                    .iter()
                    .filter(|p| p.required)
                    .map(|p| p.name.as_str())
                    .collect();
                let ordering: Vec<&str> = properties.iter().map(|p| p.name.as_str()).collect();
                json!({
                    "type": "OBJECT",
                    "properties": props,
                    "required": required,
                    "propertyOrdering": ordering
                })
            }
            Shape::Keyed => {
                let keys = variants.distinct_labels();
                let props: Map<String, Value> = keys
                    .iter()
                    .map(|k| (k.clone(), json!({"type": "STRING"})))
                    .collect();
                json!({
                    "type": "OBJECT",
                    "properties": props,
                    "required": keys,
                    "propertyOrdering": keys
                })
            }
        }
    }

    /// Checks `value` against the shape and returns its cleaned form.
    ///
    /// Optional properties that are `null` are removed. Keyed objects are
    /// lenient: entries whose value is not a string are dropped, and which
    /// keys are present is left for the reconciler to settle.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeMismatch`] found, depth first.
    pub fn conform(&self, value: &Value) -> Result<Value, ShapeMismatch> {
        self.conform_at(value, "")
    }

    fn conform_at(&self, value: &Value, path: &str) -> Result<Value, ShapeMismatch> {
        match (self, value) {
            (Shape::String, Value::String(_)) => Ok(value.clone()),
            (Shape::Number, Value::Number(_)) => Ok(value.clone()),
            (Shape::Integer, Value::Number(n)) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
                Ok(value.clone())
            }
            (Shape::Boolean, Value::Bool(_)) => Ok(value.clone()),
            (Shape::Enum(tokens), Value::String(s)) if tokens.iter().any(|t| t == s) => {
                Ok(value.clone())
            }
            (Shape::Enum(tokens), _) => Err(ShapeMismatch::new(
                path,
                format!("one of [{}]", tokens.join(", ")),
            )),
            (Shape::Array(item), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| item.conform_at(v, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Shape::Object(properties), Value::Object(map)) => {
                let mut out = map.clone();
                for property in properties {
                    let child = format!("{}.{}", path, property.name);
                    match map.get(&property.name) {
                        None | Some(Value::Null) if property.required => {
                            return Err(ShapeMismatch::new(&child, property.shape.kind_name()));
                        }
                        None | Some(Value::Null) => {
                            out.remove(&property.name);
                        }
                        Some(v) => {
                            out.insert(property.name.clone(), property.shape.conform_at(v, &child)?);
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            (Shape::Keyed, Value::Object(map)) => Ok(Value::Object(
                map.iter()
                    .filter(|(_, v)| v.is_string())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )),
            (shape, _) => Err(ShapeMismatch::new(path, shape.kind_name())),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Number => "number",
            Shape::Integer => "integer",
            Shape::Boolean => "boolean",
            Shape::Enum(_) => "enum",
            Shape::Array(_) => "array",
            Shape::Object(_) | Shape::Keyed => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_shape() -> Shape {
        Shape::object([
            Property::new("title", Shape::String),
            Property::new(
                "questions",
                Shape::array(Shape::object([
                    Property::new("question", Shape::String),
                    Property::new("options", Shape::strings()),
                    Property::new("hint", Shape::String).optional(),
                ])),
            ),
        ])
    }

    #[test]
    fn object_schema_lists_required_properties() {
        let schema = quiz_shape().to_response_schema(&Variants::Items(3));
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["title", "questions"]));
        let item = &schema["properties"]["questions"]["items"];
        assert_eq!(item["required"], json!(["question", "options"]));
        assert_eq!(item["properties"]["options"]["items"]["type"], "STRING");
    }

    #[test]
    fn descriptions_and_enums_are_rendered() {
        let shape = Shape::object([Property::new(
            "type",
            Shape::one_of(["true-false", "short-answer"]),
        )
        .describe("Question format")]);
        let schema = shape.to_response_schema(&Variants::Items(1));
        assert_eq!(
            schema["properties"]["type"],
            json!({"type": "STRING", "enum": ["true-false", "short-answer"], "description": "Question format"})
        );
    }

    #[test]
    fn keyed_schema_collapses_duplicate_keys() {
        let schema = Shape::Keyed.to_response_schema(&Variants::keys(["en", "en", "fr"]));
        assert_eq!(schema["required"], json!(["en", "fr"]));
    }

    #[test]
    fn conforming_value_passes_and_drops_null_optionals() {
        let value = json!({
            "title": "Plants",
            "questions": [{"question": "Q1", "options": ["a", "b"], "hint": null}]
        });
        let cleaned = quiz_shape().conform(&value).unwrap();
        assert!(cleaned["questions"][0].get("hint").is_none());
    }

    #[test]
    fn missing_required_property_is_reported_with_path() {
        let value = json!({"title": "Plants", "questions": [{"question": "Q1"}]});
        let err = quiz_shape().conform(&value).unwrap_err();
        assert_eq!(err.path, ".questions[0].options");
        assert_eq!(err.expected, "array");
    }

    #[test]
    fn wrong_top_level_type_is_a_mismatch() {
        let err = quiz_shape().conform(&json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn keyed_drops_non_string_entries() {
        let cleaned = Shape::Keyed
            .conform(&json!({"en": "Hello", "fr": 3, "hi": null}))
            .unwrap();
        assert_eq!(cleaned, json!({"en": "Hello"}));
    }

    #[test]
    fn integers_accept_integral_floats_only() {
        assert!(Shape::Integer.conform(&json!(4.0)).is_ok());
        assert!(Shape::Integer.conform(&json!(4.5)).is_err());
        assert!(Shape::one_of(["a"]).conform(&json!("b")).is_err());
    }
}
