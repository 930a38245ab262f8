//! Result reconciliation.
//!
//! Whatever the model produced, the caller gets a complete value of the
//! declared shape. Outputs are completed to exactly the requested variants
//! (keys, item count or criteria), and an empty result becomes a placeholder
//! built by the output type's [`Reconcile`] implementation.

use crate::{EmptyReason, GenerationResult, NormalizedRequest};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// What the caller asked to receive content for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variants {
    /// One entry per key, e.g. language codes; order and duplicates as given
    Keys(Vec<String>),
    /// A requested number of items
    Items(usize),
    /// A single subject
    Single(String),
}

impl Variants {
    /// Keyed variants from any list of tokens.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variants::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Human-readable label of every variant, in request order.
    ///
    /// Items are numbered from one.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Variants::Keys(keys) => keys.clone(),
            Variants::Items(count) => (1..=*count).map(|i| i.to_string()).collect(),
            Variants::Single(subject) => vec![subject.clone()],
        }
    }

    /// Labels with duplicates removed, keeping first occurrence order.
    pub fn distinct_labels(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.labels()
            .into_iter()
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }

    /// Number of requested variants, duplicates included.
    pub fn len(&self) -> usize {
        match self {
            Variants::Keys(keys) => keys.len(),
            Variants::Items(count) => *count,
            Variants::Single(_) => 1,
        }
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Placeholder text for a variant the model did not answer.
///
/// # Examples
///
/// ```
/// use sahayak_flow::placeholder_text;
///
/// assert_eq!(placeholder_text("Translation", "fr"), "Translation not available for fr");
/// ```
pub fn placeholder_text(label: &str, variant: &str) -> String {
    format!("{} not available for {}", label, variant)
}

/// Brings a list of generated items to the requested item count.
///
/// Extra items are dropped. Missing positions are filled by `placeholder`,
/// which receives the one-based position label. Returns the labels that
/// were filled. Variants other than [`Variants::Items`] leave `items`
/// untouched.
///
/// # Examples
///
/// ```
/// use sahayak_flow::{Variants, complete_items};
///
/// let mut slides = vec!["Intro".to_string()];
/// let filled = complete_items(&mut slides, &Variants::Items(3), |n| format!("Slide {}", n));
///
/// assert_eq!(slides, vec!["Intro", "Slide 2", "Slide 3"]);
/// assert_eq!(filled, vec!["2", "3"]);
/// ```
pub fn complete_items<T>(
    items: &mut Vec<T>,
    variants: &Variants,
    placeholder: impl Fn(&str) -> T,
) -> Vec<String> {
    let Variants::Items(count) = variants else {
        return Vec::new();
    };
    items.truncate(*count);

    let filled: Vec<String> = (items.len() + 1..=*count).map(|n| n.to_string()).collect();
    items.extend(filled.iter().map(|n| placeholder(n)));
    filled
}

/// How an output type is completed and substituted.
///
/// `complete` runs on successful output and reports which variants it had
/// to fill in; the default leaves the value untouched. `placeholder` builds
/// the full substitute used when the model produced nothing usable.
pub trait Reconcile: Sized {
    /// Fill gaps in a successful output. Returns the completed value and the
    /// variants that received placeholders.
    fn complete(self, _variants: &Variants, _label: &str) -> (Self, Vec<String>) {
        (self, Vec::new())
    }

    /// A complete placeholder value of the declared shape.
    fn placeholder(variants: &Variants, label: &str, request: &NormalizedRequest) -> Self;
}

/// Content keyed by variant, e.g. language code to translated text.
///
/// After reconciliation the key set equals the set of requested variants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedContent(BTreeMap<String, String>);

impl KeyedContent {
    /// Creates keyed content from pairs.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Text for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl Reconcile for KeyedContent {
    fn complete(mut self, variants: &Variants, label: &str) -> (Self, Vec<String>) {
        let requested: BTreeSet<String> = variants.labels().into_iter().collect();
        self.0.retain(|key, _| requested.contains(key));

        let mut filled = Vec::new();
        for key in variants.distinct_labels() {
            if !self.0.contains_key(&key) {
                self.0.insert(key.clone(), placeholder_text(label, &key));
                filled.push(key);
            }
        }
        (self, filled)
    }

    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self(
            variants
                .labels()
                .into_iter()
                .map(|key| {
                    let text = placeholder_text(label, &key);
                    (key, text)
                })
                .collect(),
        )
    }
}

/// A fallback that happened, for logging and metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackEvent {
    /// Variants that received placeholder content
    pub variants: Vec<String>,
    /// Why, when the whole result was empty; `None` for a partial answer
    pub reason: Option<EmptyReason>,
}

/// Turns a [`GenerationResult`] into a complete value.
///
/// Never fails. Emits one warning per fallback naming the flow, the
/// affected variants and the identifying request parameters.
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    flow: &'a str,
    label: &'a str,
    identifying_fields: &'a [&'a str],
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler for one flow.
    ///
    /// `label` names the content in placeholders ("Translation");
    /// `identifying_fields` are request fields copied into fallback logs.
    pub fn new(flow: &'a str, label: &'a str, identifying_fields: &'a [&'a str]) -> Self {
        Self {
            flow,
            label,
            identifying_fields,
        }
    }

    /// Completes `result` for `variants`.
    ///
    /// Returns the value and the fallback that occurred, if any.
    pub fn reconcile<T: Reconcile>(
        &self,
        result: GenerationResult<T>,
        variants: &Variants,
        request: &NormalizedRequest,
    ) -> (T, Option<FallbackEvent>) {
        let (value, event) = match result {
            GenerationResult::Success(output) => {
                let (value, filled) = output.complete(variants, self.label);
                let event = (!filled.is_empty()).then_some(FallbackEvent {
                    variants: filled,
                    reason: None,
                });
                (value, event)
            }
            GenerationResult::Empty(reason) => {
                let value = T::placeholder(variants, self.label, request);
                let event = FallbackEvent {
                    variants: variants.distinct_labels(),
                    reason: Some(reason),
                };
                (value, Some(event))
            }
        };

        match &event {
            Some(event) => self.log_fallback(event, request),
            None => debug!(flow = self.flow, "Model output used as-is"),
        }
        (value, event)
    }

    fn log_fallback(&self, event: &FallbackEvent, request: &NormalizedRequest) {
        let identity = self
            .identifying_fields
            .iter()
            .filter_map(|field| request.display(field).map(|v| format!("{}={}", field, v)))
            .collect::<Vec<_>>()
            .join("; ");
        let reason = event
            .reason
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "partial".to_string());

        warn!(
            flow = self.flow,
            variants = %event.variants.join(","),
            reason = %reason,
            request = %identity,
            "Substituted placeholder content"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> NormalizedRequest {
        crate::RequestSchema::default()
            .normalize(json!({"prompt": "Greeting"}).as_object().unwrap())
            .unwrap()
    }

    #[test]
    fn partial_keyed_answer_is_completed() {
        let reconciler = Reconciler::new("multi_language_content", "Translation", &["prompt"]);
        let variants = Variants::keys(["en", "fr"]);
        let result = GenerationResult::Success(KeyedContent::new([("en", "Hello")]));

        let (value, event) = reconciler.reconcile(result, &variants, &request());

        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"en": "Hello", "fr": "Translation not available for fr"})
        );
        assert_eq!(event.unwrap().variants, vec!["fr".to_string()]);
    }

    #[test]
    fn unrequested_keys_are_removed() {
        let reconciler = Reconciler::new("multi_language_content", "Translation", &[]);
        let variants = Variants::keys(["en"]);
        let result = GenerationResult::Success(KeyedContent::new([("en", "Hi"), ("de", "Hallo")]));

        let (value, event) = reconciler.reconcile(result, &variants, &request());

        assert_eq!(value.keys().collect::<Vec<_>>(), vec!["en"]);
        assert!(event.is_none());
    }

    #[test]
    fn empty_result_becomes_full_placeholder() {
        let reconciler = Reconciler::new("multi_language_content", "Translation", &["prompt"]);
        let variants = Variants::keys(["hi", "ta"]);

        let (value, event) = reconciler.reconcile::<KeyedContent>(
            GenerationResult::Empty(EmptyReason::Unparseable),
            &variants,
            &request(),
        );

        assert_eq!(value.get("hi"), Some("Translation not available for hi"));
        assert_eq!(value.get("ta"), Some("Translation not available for ta"));
        let event = event.unwrap();
        assert_eq!(event.reason, Some(EmptyReason::Unparseable));
        assert_eq!(event.variants, vec!["hi".to_string(), "ta".to_string()]);
    }

    #[test]
    fn duplicate_keys_collapse_to_one_entry() {
        let reconciler = Reconciler::new("multi_language_content", "Translation", &[]);
        let variants = Variants::keys(["en", "en", "fr"]);

        let (value, _) = reconciler.reconcile::<KeyedContent>(
            GenerationResult::Empty(EmptyReason::NoContent),
            &variants,
            &request(),
        );

        assert_eq!(value.len(), 2);
    }

    #[test]
    fn short_item_lists_are_padded_in_position_order() {
        let mut items = vec!["a".to_string()];
        let filled = complete_items(&mut items, &Variants::Items(3), |n| format!("missing {}", n));
        assert_eq!(items, vec!["a", "missing 2", "missing 3"]);
        assert_eq!(filled, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn long_item_lists_are_truncated_without_fallback() {
        let mut items = vec![1, 2, 3, 4];
        let filled = complete_items(&mut items, &Variants::Items(2), |_| 0);
        assert_eq!(items, vec![1, 2]);
        assert!(filled.is_empty());
    }

    #[test]
    fn item_completion_ignores_other_variants() {
        let mut items: Vec<u8> = Vec::new();
        assert!(complete_items(&mut items, &Variants::Single("x".into()), |_| 0).is_empty());
        assert!(items.is_empty());
    }

    #[test]
    fn variant_labels() {
        assert_eq!(Variants::Items(3).labels(), vec!["1", "2", "3"]);
        assert_eq!(Variants::Single("Soil".into()).labels(), vec!["Soil"]);
        assert_eq!(Variants::keys(["a", "b", "a"]).distinct_labels(), vec!["a", "b"]);
        assert_eq!(Variants::keys(["a", "b", "a"]).len(), 3);
        assert!(Variants::Items(0).is_empty());
    }
}
