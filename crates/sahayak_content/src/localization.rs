//! Keyed multi-language flows.
//!
//! Both flows return one text per requested language code. Codes are opaque
//! tokens: `"xx"` is asked for like any other.

use crate::common::school_grade;
use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, KeyedContent, RequestSchema, Shape, VariantSource,
};
use serde::{Deserialize, Serialize};

const MULTI_LANGUAGE_TEMPLATE: &str = "\
You write educational content in several languages at once.

Prompt: {{prompt}}

Write the content once per language below. Answer with a JSON object whose \
keys are exactly these ISO 639-1 codes and whose values are the content in \
that language.

Languages: {{#each languages}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}";

const LOCALIZED_TEMPLATE: &str = "\
You are a curriculum writer working across many Indian and world languages. \
Write a {{contentType}} for students in grade {{gradeLevel}}, using vocabulary \
and examples that suit that grade.

Prompt: {{prompt}}

Produce it in each of these languages: \
{{#each languages}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}.

Answer with a JSON object mapping each ISO 639-1 code to the {{contentType}} \
written in that language.";

/// Input of [`MultiLanguageFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct MultiLanguageRequest {
    /// What to write about
    prompt: String,
    /// ISO 639-1 codes, in the order they should be written
    languages: Vec<String>,
}

impl MultiLanguageRequest {
    /// Creates a builder.
    pub fn builder() -> MultiLanguageRequestBuilder {
        MultiLanguageRequestBuilder::default()
    }
}

/// Same content written in several languages.
pub struct MultiLanguageFlow {
    spec: FlowSpec,
}

impl MultiLanguageFlow {
    /// Flow name.
    pub const NAME: &'static str = "multi_language_content";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let spec = FlowSpec::new(
            Self::NAME,
            MULTI_LANGUAGE_TEMPLATE,
            RequestSchema::new(vec![FieldSpec::text("prompt"), FieldSpec::list("languages")]),
            Shape::Keyed,
            VariantSource::Keys("languages"),
            "Translation",
        )?
        .with_description("Write the same content in several languages")
        .identified_by(&["prompt"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for MultiLanguageFlow {
    type Input = MultiLanguageRequest;
    type Output = KeyedContent;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Input of [`LocalizedContentFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct LocalizedContentRequest {
    /// Topic or prompt
    prompt: String,
    /// Kind of content, e.g. story, poem, explanation
    content_type: String,
    /// Target school grade, 1 to 12
    grade_level: u32,
    /// ISO 639-1 codes
    languages: Vec<String>,
}

impl LocalizedContentRequest {
    /// Creates a builder.
    pub fn builder() -> LocalizedContentRequestBuilder {
        LocalizedContentRequestBuilder::default()
    }
}

/// Grade-adapted content in several languages.
pub struct LocalizedContentFlow {
    spec: FlowSpec,
}

impl LocalizedContentFlow {
    /// Flow name.
    pub const NAME: &'static str = "localized_content";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let spec = FlowSpec::new(
            Self::NAME,
            LOCALIZED_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("prompt"),
                FieldSpec::text("contentType"),
                school_grade(),
                FieldSpec::list("languages"),
            ]),
            Shape::Keyed,
            VariantSource::Keys("languages"),
            "Translation",
        )?
        .with_description("Write grade-adapted content in several languages")
        .identified_by(&["prompt", "contentType", "gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for LocalizedContentFlow {
    type Input = LocalizedContentRequest;
    type Output = KeyedContent;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}
