//! End-to-end tests for the flow runner against a mock driver.

mod test_utils;

use sahayak_error::{SahayakErrorKind, ValidationErrorKind};
use sahayak_flow::{ContentFlow, FlowRunner, KeyedContent, RawRequest};
use serde_json::json;
use std::sync::Arc;
use test_utils::{MockDriver, TranslateFlow, TranslateInput, bounded_spec, text_response, timeout};

fn input(prompt: &str, languages: &[&str]) -> TranslateInput {
    TranslateInput {
        prompt: prompt.to_string(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
    }
}

fn raw(value: serde_json::Value) -> RawRequest {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn complete_answer_is_returned_unchanged() {
    let driver = Arc::new(MockDriver::answering(r#"{"en": "Hello", "fr": "Bonjour"}"#));
    let runner = FlowRunner::new(driver.clone());

    let output = runner
        .run(&TranslateFlow::new(), &input("Greeting", &["en", "fr"]))
        .await
        .unwrap();

    assert_eq!(output, KeyedContent::new([("en", "Hello"), ("fr", "Bonjour")]));
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn prompt_is_rendered_from_normalized_request() {
    let driver = Arc::new(MockDriver::answering(r#"{"en": "x"}"#));
    let runner = FlowRunner::new(driver.clone());

    runner
        .run_raw::<KeyedContent>(
            TranslateFlow::new().spec(),
            &raw(json!({"prompt": "Rain", "languages": " en ,, hi "})),
        )
        .await
        .unwrap();

    assert_eq!(driver.last_prompt().as_deref(), Some("Write about Rain in: en, hi"));
    let request = driver.last_request().unwrap();
    let schema = match request.response_format() {
        Some(sahayak_core::ResponseFormat::Json { schema }) => schema.clone(),
        other => panic!("expected JSON format, got {:?}", other),
    };
    assert_eq!(schema["required"], json!(["en", "hi"]));
}

#[tokio::test]
async fn partial_answer_gets_placeholders() {
    let driver = Arc::new(MockDriver::answering(r#"{"en": "Hello"}"#));
    let runner = FlowRunner::new(driver);

    let outcome = runner
        .run_detailed::<KeyedContent>(
            TranslateFlow::new().spec(),
            &raw(json!({"prompt": "Greeting", "languages": ["en", "fr"]})),
        )
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(outcome.value()).unwrap(),
        json!({"en": "Hello", "fr": "Translation not available for fr"})
    );
    assert!(outcome.fell_back());
    assert_eq!(outcome.fallback().as_ref().unwrap().variants, vec!["fr".to_string()]);
}

#[tokio::test]
async fn unparseable_answer_becomes_full_placeholder() {
    let driver = Arc::new(MockDriver::answering("Sorry, I can't do that."));
    let runner = FlowRunner::new(driver);

    let output = runner
        .run(&TranslateFlow::new(), &input("Greeting", &["hi", "ta"]))
        .await
        .unwrap();

    assert_eq!(output.get("hi"), Some("Translation not available for hi"));
    assert_eq!(output.get("ta"), Some("Translation not available for ta"));
}

#[tokio::test]
async fn validation_failure_never_calls_the_model() {
    let driver = Arc::new(MockDriver::answering("{}"));
    let runner = FlowRunner::new(driver.clone());

    let err = runner
        .run(&TranslateFlow::new(), &input("Greeting", &[" ", ""]))
        .await
        .unwrap_err();

    let validation = err.validation().expect("validation error");
    assert_eq!(validation.field, "languages");
    assert_eq!(validation.kind, ValidationErrorKind::EmptyList);
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn missing_required_field_is_rejected() {
    let driver = Arc::new(MockDriver::answering("{}"));
    let runner = FlowRunner::new(driver.clone());

    let err = runner
        .run_raw::<KeyedContent>(TranslateFlow::new().spec(), &raw(json!({"languages": "en"})))
        .await
        .unwrap_err();

    assert_eq!(err.validation().unwrap().field, "prompt");
    assert_eq!(err.validation().unwrap().kind, ValidationErrorKind::MissingField);
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn bounds_are_inclusive() {
    let driver = Arc::new(MockDriver::answering(r#"{"1": "a"}"#));
    let runner = FlowRunner::new(driver.clone());
    let spec = bounded_spec();

    for (count, accepted) in [(0, false), (1, true), (10, true), (11, false)] {
        let result = runner
            .run_raw::<KeyedContent>(&spec, &raw(json!({"topic": "Birds", "count": count})))
            .await;
        assert_eq!(result.is_ok(), accepted, "count = {}", count);
        if !accepted {
            let err = result.unwrap_err();
            assert!(matches!(
                err.validation().unwrap().kind,
                ValidationErrorKind::OutOfRange { .. }
            ));
        }
    }
    assert_eq!(driver.calls(), 2);
}

#[tokio::test]
async fn transport_failure_propagates() {
    let driver = Arc::new(MockDriver::failing(timeout()));
    let runner = FlowRunner::new(driver.clone());

    let err = runner
        .run(&TranslateFlow::new(), &input("Greeting", &["en"]))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), SahayakErrorKind::Transport(_)));
    assert!(err.transport().is_some());
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn duplicate_variants_are_preserved_in_prompt() {
    let driver = Arc::new(MockDriver::answering(r#"{"en": "Hi"}"#));
    let runner = FlowRunner::new(driver.clone());

    let output = runner
        .run(&TranslateFlow::new(), &input("Greeting", &["en", "en"]))
        .await
        .unwrap();

    assert_eq!(driver.last_prompt().as_deref(), Some("Write about Greeting in: en, en"));
    assert_eq!(output.len(), 1);
}

#[tokio::test]
async fn concurrent_runs_are_independent() {
    let driver = Arc::new(MockDriver::scripted(
        vec![
            Ok(text_response(r#"{"en": "one"}"#)),
            Ok(text_response("not json")),
        ],
        Ok(text_response(r#"{"en": "three"}"#)),
    ));
    let runner = Arc::new(FlowRunner::new(driver.clone()));
    let flow = Arc::new(TranslateFlow::new());

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let runner = runner.clone();
            let flow = flow.clone();
            tokio::spawn(async move { runner.run(flow.as_ref(), &input("Greeting", &["en"])).await })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        let output = handle.await.unwrap().unwrap();
        values.push(output.get("en").unwrap().to_string());
    }
    values.sort();

    assert_eq!(driver.calls(), 3);
    assert_eq!(values, vec!["Translation not available for en", "one", "three"]);
}

#[tokio::test]
async fn request_ids_are_unique_per_run() {
    let driver = Arc::new(MockDriver::answering(r#"{"en": "Hi"}"#));
    let runner = FlowRunner::new(driver);
    let flow = TranslateFlow::new();
    let request = raw(json!({"prompt": "Greeting", "languages": "en"}));

    let first = runner
        .run_detailed::<KeyedContent>(flow.spec(), &request)
        .await
        .unwrap();
    let second = runner
        .run_detailed::<KeyedContent>(flow.spec(), &request)
        .await
        .unwrap();

    assert_ne!(first.request_id(), second.request_id());
    assert!(!first.fell_back());
}
