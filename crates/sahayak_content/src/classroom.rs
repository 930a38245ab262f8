//! Discussion material, grade adaptation and presentation outlines.

use crate::common::{any_grade, subject, unavailable};
use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, NormalizedRequest, Property, Reconcile, RequestSchema, Shape,
    VariantSource, Variants, complete_items, placeholder_text,
};
use serde::{Deserialize, Serialize};

const DISCUSSION_TEMPLATE: &str = "\
You help teachers run dialogic classroom discussions.

Topic: {{topic}}
Grade level: {{gradeLevel}}

Prepare open-ended questions that push students to reason, key vocabulary \
with definitions a student of this grade understands, and a few contrasting \
viewpoints on the topic (a title and a summary each). Match the language to \
the grade.";

const ADAPT_TEMPLATE: &str = "\
You adapt teaching material to a different grade level. Rewrite the content \
so that its vocabulary, sentence length and difficulty suit grade \
{{gradeLevel}} while keeping its meaning.

Content:
{{content}}";

const PRESENTATION_TEMPLATE: &str = "\
You build educational slide decks.

Topic: {{topic}}
Number of slides: {{numSlides}}
{{#if additionalInstructions}}Additional instructions: {{additionalInstructions}}
{{/if}}
Write exactly that many slides, opening with an introduction and ending with \
a summary. Each slide has a short title, three to five bullet points, speaker \
notes that expand on the bullets, and a concrete description of a visual aid \
(\"a labelled diagram of the water cycle\") that an illustrator could draw.";

/// Input of [`DiscussionFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct DiscussionRequest {
    topic: String,
    grade_level: u32,
}

impl DiscussionRequest {
    /// Creates a builder.
    pub fn builder() -> DiscussionRequestBuilder {
        DiscussionRequestBuilder::default()
    }
}

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct VocabularyEntry {
    word: String,
    definition: String,
}

/// One perspective on the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Viewpoint {
    title: String,
    summary: String,
}

/// Material for leading a discussion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionMaterial {
    discussion_questions: Vec<String>,
    vocabulary: Vec<VocabularyEntry>,
    viewpoints: Vec<Viewpoint>,
}

impl Reconcile for DiscussionMaterial {
    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            discussion_questions: vec![unavailable(label, variants)],
            vocabulary: Vec::new(),
            viewpoints: Vec::new(),
        }
    }
}

/// Questions, vocabulary and viewpoints for a class discussion.
pub struct DiscussionFlow {
    spec: FlowSpec,
}

impl DiscussionFlow {
    /// Flow name.
    pub const NAME: &'static str = "discussion";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let spec = FlowSpec::new(
            Self::NAME,
            DISCUSSION_TEMPLATE,
            RequestSchema::new(vec![FieldSpec::text("topic"), any_grade()]),
            Shape::object([
                Property::new("discussionQuestions", Shape::strings()),
                Property::new(
                    "vocabulary",
                    Shape::array(Shape::object([
                        Property::new("word", Shape::String),
                        Property::new("definition", Shape::String),
                    ])),
                ),
                Property::new(
                    "viewpoints",
                    Shape::array(Shape::object([
                        Property::new("title", Shape::String),
                        Property::new("summary", Shape::String),
                    ])),
                ),
            ]),
            VariantSource::Single("topic"),
            "Discussion material",
        )?
        .with_description("Discussion questions, vocabulary and viewpoints")
        .identified_by(&["topic", "gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for DiscussionFlow {
    type Input = DiscussionRequest;
    type Output = DiscussionMaterial;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Input of [`AdaptContentFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct AdaptContentRequest {
    /// Material to rewrite
    content: String,
    /// Grade to rewrite it for
    grade_level: u32,
}

impl AdaptContentRequest {
    /// Creates a builder.
    pub fn builder() -> AdaptContentRequestBuilder {
        AdaptContentRequestBuilder::default()
    }
}

/// Content rewritten for a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedContent {
    adapted_content: String,
}

impl Reconcile for AdaptedContent {
    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            adapted_content: placeholder_text(label, &format!("grade {}", subject(variants))),
        }
    }
}

/// Rewrites material for another grade level.
pub struct AdaptContentFlow {
    spec: FlowSpec,
}

impl AdaptContentFlow {
    /// Flow name.
    pub const NAME: &'static str = "adapt_content";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let spec = FlowSpec::new(
            Self::NAME,
            ADAPT_TEMPLATE,
            RequestSchema::new(vec![FieldSpec::text("content"), any_grade()]),
            Shape::object([Property::new("adaptedContent", Shape::String)]),
            VariantSource::Single("gradeLevel"),
            "Adapted content",
        )?
        .with_description("Rewrite material for a different grade level")
        .identified_by(&["gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for AdaptContentFlow {
    type Input = AdaptContentRequest;
    type Output = AdaptedContent;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Input of [`PresentationFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct PresentationRequest {
    topic: String,
    /// Number of slides, 3 to 15
    num_slides: u32,
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    additional_instructions: Option<String>,
}

impl PresentationRequest {
    /// Creates a builder.
    pub fn builder() -> PresentationRequestBuilder {
        PresentationRequestBuilder::default()
    }
}

/// One slide of an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    title: String,
    /// Bullet points
    content: Vec<String>,
    speaker_notes: String,
    /// Description of an illustration for the slide
    visual_suggestion: String,
}

/// A generated presentation outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Presentation {
    title: String,
    slides: Vec<Slide>,
}

impl Slide {
    fn unavailable(label: &str, position: &str) -> Self {
        Self {
            title: placeholder_text(label, position),
            content: Vec::new(),
            speaker_notes: String::new(),
            visual_suggestion: String::new(),
        }
    }
}

impl Reconcile for Presentation {
    fn complete(mut self, variants: &Variants, label: &str) -> (Self, Vec<String>) {
        let filled = complete_items(&mut self.slides, variants, |n| Slide::unavailable(label, n));
        (self, filled)
    }

    fn placeholder(variants: &Variants, label: &str, request: &NormalizedRequest) -> Self {
        let topic = request.display("topic").unwrap_or_default();
        Self {
            title: placeholder_text("Presentation", &topic),
            slides: variants
                .labels()
                .iter()
                .map(|n| Slide::unavailable(label, n))
                .collect(),
        }
    }
}

/// Slide-by-slide presentation outline.
pub struct PresentationFlow {
    spec: FlowSpec,
}

impl PresentationFlow {
    /// Flow name.
    pub const NAME: &'static str = "presentation";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let slide = Shape::object([
            Property::new("title", Shape::String),
            Property::new("content", Shape::strings()).describe("Bullet points"),
            Property::new("speakerNotes", Shape::String),
            Property::new("visualSuggestion", Shape::String),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            PRESENTATION_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("topic"),
                FieldSpec::integer("numSlides", Some(3), Some(15)),
                FieldSpec::text("additionalInstructions").optional(),
            ]),
            Shape::object([
                Property::new("title", Shape::String),
                Property::new("slides", Shape::array(slide)),
            ]),
            VariantSource::Items("numSlides"),
            "Slide",
        )?
        .with_description("Presentation outline with speaker notes and visual ideas")
        .identified_by(&["topic"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for PresentationFlow {
    type Input = PresentationRequest;
    type Output = Presentation;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}
