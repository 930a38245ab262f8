//! Request assembly from CLI arguments.

use sahayak::{FieldKind, RawRequest, RequestSchema};
use serde_json::Value;
use std::path::Path;

/// Merges an optional JSON file with `key=value` parameters.
///
/// Values are typed by the flow's field declarations: numeric fields parse
/// as numbers and JSON fields as JSON. Text, enum and list fields stay
/// strings, as does anything the schema does not declare.
pub fn build_request(
    schema: &RequestSchema,
    input: Option<&Path>,
    params: &[String],
) -> anyhow::Result<RawRequest> {
    let mut request = match input {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            match serde_json::from_str(&contents)? {
                Value::Object(map) => map,
                _ => anyhow::bail!("{} must contain a JSON object", path.display()),
            }
        }
        None => RawRequest::new(),
    };

    for param in params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", param))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Empty parameter name in '{}'", param);
        }
        request.insert(key.to_string(), typed_value(schema, key, value));
    }

    Ok(request)
}

fn typed_value(schema: &RequestSchema, key: &str, value: &str) -> Value {
    let kind = schema.field(key).map(|field| field.kind());
    match kind {
        Some(FieldKind::Number { .. } | FieldKind::Integer { .. } | FieldKind::Json) => {
            serde_json::from_str(value.trim()).unwrap_or_else(|_| Value::String(value.to_string()))
        }
        _ => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sahayak::FieldSpec;
    use serde_json::json;
    use std::io::Write;

    fn schema() -> RequestSchema {
        RequestSchema::new(vec![
            FieldSpec::text("topic"),
            FieldSpec::integer("numQuestions", Some(1), Some(20)),
            FieldSpec::json("gradeData"),
        ])
    }

    #[test]
    fn params_are_typed_by_schema() {
        let request = build_request(
            &schema(),
            None,
            &[
                "topic=42".to_string(),
                "numQuestions=5".to_string(),
                "gradeData=[{\"subject\":\"Math\"}]".to_string(),
                "languages=en,fr".to_string(),
            ],
        )
        .unwrap();

        assert_eq!(request["topic"], json!("42"));
        assert_eq!(request["numQuestions"], json!(5));
        assert_eq!(request["gradeData"], json!([{"subject": "Math"}]));
        assert_eq!(request["languages"], json!("en,fr"));
    }

    #[test]
    fn non_numeric_value_is_left_for_validation() {
        let request = build_request(&schema(), None, &["numQuestions=many".to_string()]).unwrap();
        assert_eq!(request["numQuestions"], json!("many"));
    }

    #[test]
    fn params_override_input_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"topic": "Soil", "numQuestions": 3}}"#).unwrap();

        let request =
            build_request(&schema(), Some(file.path()), &["numQuestions=7".to_string()]).unwrap();

        assert_eq!(request["topic"], json!("Soil"));
        assert_eq!(request["numQuestions"], json!(7));
    }

    #[test]
    fn malformed_param_is_an_error() {
        assert!(build_request(&schema(), None, &["topic".to_string()]).is_err());
        assert!(build_request(&schema(), None, &["=x".to_string()]).is_err());
    }
}
