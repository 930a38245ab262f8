//! Property tests for normalization and reconciliation.

use proptest::prelude::*;
use sahayak_flow::{
    EmptyReason, FieldSpec, GenerationResult, KeyedContent, RawRequest, Reconciler, RequestSchema,
    Variants, placeholder_text,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;

fn schema() -> RequestSchema {
    RequestSchema::new(vec![
        FieldSpec::text("prompt"),
        FieldSpec::list("languages"),
        FieldSpec::integer("count", Some(1), Some(20)).optional(),
        FieldSpec::one_of("level", ["easy", "medium", "hard"]).optional(),
    ])
}

fn language() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["en", "hi", "ta", "fr", "bn", "mr"]).prop_map(str::to_string)
}

fn padded(token: String) -> impl Strategy<Value = String> {
    ("[ ]{0,2}", "[ ]{0,2}").prop_map(move |(l, r)| format!("{}{}{}", l, token, r))
}

proptest! {
    #[test]
    fn normalizing_twice_changes_nothing(
        prompt in "[a-zA-Z ]{1,20}[a-z]",
        tokens in prop::collection::vec(language().prop_flat_map(padded), 1..6),
        count in 1i64..=20,
    ) {
        let raw: RawRequest = json!({
            "prompt": prompt,
            "languages": tokens.join(","),
            "count": count as f64,
            "level": "easy",
        })
        .as_object()
        .cloned()
        .unwrap();

        let once = schema().normalize(&raw).unwrap();
        let twice = schema().normalize(&once.clone().into_raw()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn list_tokens_keep_order_and_duplicates(
        tokens in prop::collection::vec(language(), 1..8),
    ) {
        let raw: RawRequest = json!({"prompt": "x", "languages": tokens.join(" , ")})
            .as_object()
            .cloned()
            .unwrap();
        let normalized = schema().normalize(&raw).unwrap();
        let got: Vec<String> = normalized
            .list("languages")
            .unwrap()
            .into_iter()
            .map(str::to_string)
            .collect();
        prop_assert_eq!(got, tokens);
    }

    #[test]
    fn keyed_output_covers_exactly_the_requested_keys(
        requested in prop::collection::vec(language(), 1..6),
        answered in prop::collection::btree_map(language(), "[a-z]{1,8}", 0..6),
    ) {
        let variants = Variants::keys(requested.clone());
        let request = schema()
            .normalize(json!({"prompt": "x", "languages": requested}).as_object().unwrap())
            .unwrap();
        let reconciler = Reconciler::new("test", "Translation", &[]);

        let result = if answered.is_empty() {
            GenerationResult::Empty(EmptyReason::NoContent)
        } else {
            GenerationResult::Success(KeyedContent::new(answered.clone()))
        };
        let (value, _) = reconciler.reconcile(result, &variants, &request);

        let keys: BTreeSet<String> = value.keys().map(str::to_string).collect();
        let wanted: BTreeSet<String> = requested.iter().cloned().collect();
        prop_assert_eq!(&keys, &wanted);

        for key in &wanted {
            let text = value.get(key).unwrap();
            match answered.get(key) {
                Some(answer) => prop_assert_eq!(text, answer.as_str()),
                None => prop_assert_eq!(text.to_string(), placeholder_text("Translation", key)),
            }
        }
    }

    #[test]
    fn out_of_range_integers_are_always_rejected(count in prop_oneof![-50i64..1, 21i64..100]) {
        let raw: RawRequest = json!({"prompt": "x", "languages": "en", "count": count})
            .as_object()
            .cloned()
            .unwrap();
        let err = schema().normalize(&raw).unwrap_err();
        prop_assert_eq!(err.field, "count");
    }
}

#[test]
fn unknown_fields_pass_through() {
    let raw: RawRequest = json!({"prompt": "x", "languages": "en", "extra": [1, 2]})
        .as_object()
        .cloned()
        .unwrap();
    let normalized = schema().normalize(&raw).unwrap();
    assert_eq!(normalized.get("extra"), Some(&Value::from(vec![1, 2])));
}
