//! Quizzes, worksheets and rubrics.

use crate::common::school_grade;
use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, NormalizedRequest, Property, Reconcile, RequestSchema, Shape,
    VariantSource, Variants, complete_items, placeholder_text,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

const QUIZ_TEMPLATE: &str = "\
You help teachers prepare classroom assessments. Write a multiple-choice quiz \
of exactly {{numQuestions}} questions on this topic: {{topic}}.

Give every question four options and record the zero-based index of the \
correct option in correctAnswer. Title the quiz after the topic.";

const WORKSHEET_TEMPLATE: &str = "\
You are an experienced teacher preparing a practice worksheet.

Topic: {{topic}}
Grade level: {{gradeLevel}}
Number of questions: {{numQuestions}}

Mix these question types: multiple-choice, short-answer, true-false and \
fill-in-the-blank. Multiple-choice questions carry four options; the answer \
is the text of the correct option. True/false answers are \"True\" or \
\"False\". Give the worksheet a title.";

const RUBRIC_TEMPLATE: &str = "\
You design grading rubrics for teachers.

Assignment: {{assignmentDescription}}

Cover exactly these criteria, in this order: \
{{#each criteria}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}.

For each criterion describe at least three performance levels, such as \
Excellent, Good and Needs Improvement. Title the rubric after the assignment.";

/// Input of [`QuizFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct QuizRequest {
    /// Quiz subject
    topic: String,
    /// Number of questions, 1 to 20
    num_questions: u32,
}

impl QuizRequest {
    /// Creates a builder.
    pub fn builder() -> QuizRequestBuilder {
        QuizRequestBuilder::default()
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    question: String,
    options: Vec<String>,
    /// Index into `options`
    correct_answer: usize,
}

/// A generated quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Quiz {
    title: String,
    questions: Vec<QuizQuestion>,
}

impl QuizQuestion {
    fn unavailable(label: &str, position: &str) -> Self {
        Self {
            question: placeholder_text(label, position),
            options: Vec::new(),
            correct_answer: 0,
        }
    }
}

impl Reconcile for Quiz {
    fn complete(mut self, variants: &Variants, label: &str) -> (Self, Vec<String>) {
        let filled = complete_items(&mut self.questions, variants, |n| {
            QuizQuestion::unavailable(label, n)
        });
        (self, filled)
    }

    fn placeholder(variants: &Variants, label: &str, request: &NormalizedRequest) -> Self {
        let topic = request.display("topic").unwrap_or_default();
        Self {
            title: placeholder_text("Quiz", &topic),
            questions: variants
                .labels()
                .iter()
                .map(|n| QuizQuestion::unavailable(label, n))
                .collect(),
        }
    }
}

/// Multiple-choice quiz on a topic.
pub struct QuizFlow {
    spec: FlowSpec,
}

impl QuizFlow {
    /// Flow name.
    pub const NAME: &'static str = "quiz";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let question = Shape::object([
            Property::new("question", Shape::String),
            Property::new("options", Shape::strings()).describe("Four possible answers"),
            Property::new("correctAnswer", Shape::Integer)
                .describe("Zero-based index of the correct option"),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            QUIZ_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("topic"),
                FieldSpec::integer("numQuestions", Some(1), Some(20)),
            ]),
            Shape::object([
                Property::new("title", Shape::String),
                Property::new("questions", Shape::array(question)),
            ]),
            VariantSource::Items("numQuestions"),
            "Question",
        )?
        .with_description("Multiple-choice quiz on a topic")
        .identified_by(&["topic"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for QuizFlow {
    type Input = QuizRequest;
    type Output = Quiz;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Format of a worksheet question.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QuestionType {
    /// Four options, one correct
    MultipleChoice,
    /// Free-text answer
    ShortAnswer,
    /// True or False
    TrueFalse,
    /// Sentence with a gap
    FillInTheBlank,
}

/// Input of [`WorksheetFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct WorksheetRequest {
    topic: String,
    /// School grade, 1 to 12
    grade_level: u32,
    /// Number of questions, 3 to 20
    num_questions: u32,
}

impl WorksheetRequest {
    /// Creates a builder.
    pub fn builder() -> WorksheetRequestBuilder {
        WorksheetRequestBuilder::default()
    }
}

/// One worksheet question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct WorksheetQuestion {
    question: String,
    #[serde(rename = "type")]
    kind: QuestionType,
    /// Present for multiple-choice questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
    answer: String,
}

/// A generated worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Worksheet {
    title: String,
    questions: Vec<WorksheetQuestion>,
}

impl WorksheetQuestion {
    fn unavailable(label: &str, position: &str) -> Self {
        Self {
            question: placeholder_text(label, position),
            kind: QuestionType::ShortAnswer,
            options: None,
            answer: String::new(),
        }
    }
}

impl Reconcile for Worksheet {
    fn complete(mut self, variants: &Variants, label: &str) -> (Self, Vec<String>) {
        let filled = complete_items(&mut self.questions, variants, |n| {
            WorksheetQuestion::unavailable(label, n)
        });
        (self, filled)
    }

    fn placeholder(variants: &Variants, label: &str, request: &NormalizedRequest) -> Self {
        let topic = request.display("topic").unwrap_or_default();
        Self {
            title: placeholder_text("Worksheet", &topic),
            questions: variants
                .labels()
                .iter()
                .map(|n| WorksheetQuestion::unavailable(label, n))
                .collect(),
        }
    }
}

/// Mixed-format practice worksheet.
pub struct WorksheetFlow {
    spec: FlowSpec,
}

impl WorksheetFlow {
    /// Flow name.
    pub const NAME: &'static str = "worksheet";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let question = Shape::object([
            Property::new("question", Shape::String),
            Property::new(
                "type",
                Shape::one_of(QuestionType::iter().map(|t| t.to_string())),
            ),
            Property::new("options", Shape::strings())
                .optional()
                .describe("Only for multiple-choice questions"),
            Property::new("answer", Shape::String),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            WORKSHEET_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("topic"),
                school_grade(),
                FieldSpec::integer("numQuestions", Some(3), Some(20)),
            ]),
            Shape::object([
                Property::new("title", Shape::String),
                Property::new("questions", Shape::array(question)),
            ]),
            VariantSource::Items("numQuestions"),
            "Question",
        )?
        .with_description("Practice worksheet with mixed question types")
        .identified_by(&["topic", "gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for WorksheetFlow {
    type Input = WorksheetRequest;
    type Output = Worksheet;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Input of [`RubricFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct RubricRequest {
    /// What students are asked to do
    assignment_description: String,
    /// Criterion names, e.g. Clarity, Originality
    criteria: Vec<String>,
}

impl RubricRequest {
    /// Creates a builder.
    pub fn builder() -> RubricRequestBuilder {
        RubricRequestBuilder::default()
    }
}

/// One performance level of a criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct PerformanceLevel {
    level: String,
    description: String,
}

/// One rubric criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Criterion {
    name: String,
    levels: Vec<PerformanceLevel>,
}

/// A generated rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Rubric {
    title: String,
    criteria: Vec<Criterion>,
}

impl Criterion {
    fn unavailable(label: &str, name: String) -> Self {
        Self {
            levels: vec![PerformanceLevel {
                level: String::new(),
                description: placeholder_text(label, &name),
            }],
            name,
        }
    }
}

impl Reconcile for Rubric {
    /// One criterion per requested name, in request order. Criteria the
    /// model added on its own are dropped.
    fn complete(self, variants: &Variants, label: &str) -> (Self, Vec<String>) {
        let mut answered = self.criteria;
        let mut criteria = Vec::new();
        let mut filled = Vec::new();

        for name in variants.distinct_labels() {
            match answered.iter().position(|c| c.name == name) {
                Some(i) => criteria.push(answered.swap_remove(i)),
                None => {
                    criteria.push(Criterion::unavailable(label, name.clone()));
                    filled.push(name);
                }
            }
        }

        let rubric = Self {
            title: self.title,
            criteria,
        };
        (rubric, filled)
    }

    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            title: placeholder_text(label, "this assignment"),
            criteria: variants
                .distinct_labels()
                .into_iter()
                .map(|name| Criterion::unavailable(label, name))
                .collect(),
        }
    }
}

/// Grading rubric for an assignment.
pub struct RubricFlow {
    spec: FlowSpec,
}

impl RubricFlow {
    /// Flow name.
    pub const NAME: &'static str = "rubric";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let level = Shape::object([
            Property::new("level", Shape::String).describe("e.g. Excellent, Good"),
            Property::new("description", Shape::String),
        ]);
        let criterion = Shape::object([
            Property::new("name", Shape::String),
            Property::new("levels", Shape::array(level)),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            RUBRIC_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("assignmentDescription"),
                FieldSpec::list("criteria"),
            ]),
            Shape::object([
                Property::new("title", Shape::String),
                Property::new("criteria", Shape::array(criterion)),
            ]),
            VariantSource::Keys("criteria"),
            "Rubric",
        )?
        .with_description("Grading rubric with performance levels per criterion")
        .identified_by(&["assignmentDescription"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for RubricFlow {
    type Input = RubricRequest;
    type Output = Rubric;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}
