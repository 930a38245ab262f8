//! Name-based access to every flow.

use crate::{
    AdaptContentFlow, AskSahayakFlow, DiscussionFlow, EnhanceWritingFlow, LessonPlanFlow,
    LocalizedContentFlow, MentorshipPlanFlow, MultiLanguageFlow, PresentationFlow,
    ProfessionalDevelopmentFlow, QuizFlow, RubricFlow, WorksheetFlow,
};
use sahayak_error::{JsonError, SahayakResult, TemplateError};
use sahayak_flow::{ContentFlow, FlowOutcome, FlowRunner, FlowSpec, RawRequest};
use sahayak_interface::GenerativeDriver;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

/// Every available flow.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FlowKind {
    /// Same content in several languages
    MultiLanguageContent,
    /// Grade-adapted content in several languages
    LocalizedContent,
    /// Multiple-choice quiz
    Quiz,
    /// Mixed-format worksheet
    Worksheet,
    /// Timed lesson plan
    LessonPlan,
    /// Grading rubric
    Rubric,
    /// Discussion material
    Discussion,
    /// Grade-level rewrite
    AdaptContent,
    /// Student mentorship plan
    MentorshipPlan,
    /// Teacher development plan
    ProfessionalDevelopment,
    /// Writing corrections and suggestions
    EnhanceWriting,
    /// Slide outline
    Presentation,
    /// Kid-friendly explanation of a question
    AskSahayak,
}

/// All flows, built once.
///
/// # Examples
///
/// ```
/// use sahayak_content::{Catalog, FlowKind};
///
/// let catalog = Catalog::new().unwrap();
/// assert_eq!(catalog.spec(FlowKind::Quiz).name(), "quiz");
/// assert_eq!("lesson_plan".parse::<FlowKind>().unwrap(), FlowKind::LessonPlan);
/// ```
pub struct Catalog {
    multi_language: MultiLanguageFlow,
    localized: LocalizedContentFlow,
    quiz: QuizFlow,
    worksheet: WorksheetFlow,
    lesson_plan: LessonPlanFlow,
    rubric: RubricFlow,
    discussion: DiscussionFlow,
    adapt: AdaptContentFlow,
    mentorship: MentorshipPlanFlow,
    development: ProfessionalDevelopmentFlow,
    writing: EnhanceWritingFlow,
    presentation: PresentationFlow,
    ask: AskSahayakFlow,
}

impl Catalog {
    /// Builds every flow.
    ///
    /// # Errors
    ///
    /// Returns the first built-in template that fails to compile.
    pub fn new() -> Result<Self, TemplateError> {
        Ok(Self {
            multi_language: MultiLanguageFlow::new()?,
            localized: LocalizedContentFlow::new()?,
            quiz: QuizFlow::new()?,
            worksheet: WorksheetFlow::new()?,
            lesson_plan: LessonPlanFlow::new()?,
            rubric: RubricFlow::new()?,
            discussion: DiscussionFlow::new()?,
            adapt: AdaptContentFlow::new()?,
            mentorship: MentorshipPlanFlow::new()?,
            development: ProfessionalDevelopmentFlow::new()?,
            writing: EnhanceWritingFlow::new()?,
            presentation: PresentationFlow::new()?,
            ask: AskSahayakFlow::new()?,
        })
    }

    /// Definition of one flow.
    pub fn spec(&self, kind: FlowKind) -> &FlowSpec {
        match kind {
            FlowKind::MultiLanguageContent => self.multi_language.spec(),
            FlowKind::LocalizedContent => self.localized.spec(),
            FlowKind::Quiz => self.quiz.spec(),
            FlowKind::Worksheet => self.worksheet.spec(),
            FlowKind::LessonPlan => self.lesson_plan.spec(),
            FlowKind::Rubric => self.rubric.spec(),
            FlowKind::Discussion => self.discussion.spec(),
            FlowKind::AdaptContent => self.adapt.spec(),
            FlowKind::MentorshipPlan => self.mentorship.spec(),
            FlowKind::ProfessionalDevelopment => self.development.spec(),
            FlowKind::EnhanceWriting => self.writing.spec(),
            FlowKind::Presentation => self.presentation.spec(),
            FlowKind::AskSahayak => self.ask.spec(),
        }
    }

    /// Runs a flow on an untyped request and returns its output as JSON.
    ///
    /// # Errors
    ///
    /// Validation and transport failures propagate as in
    /// [`FlowRunner::run`].
    #[instrument(skip_all, fields(flow = %kind))]
    pub async fn run<D: GenerativeDriver>(
        &self,
        runner: &FlowRunner<D>,
        kind: FlowKind,
        request: &RawRequest,
    ) -> SahayakResult<FlowOutcome<Value>> {
        match kind {
            FlowKind::MultiLanguageContent => as_json(runner, &self.multi_language, request).await,
            FlowKind::LocalizedContent => as_json(runner, &self.localized, request).await,
            FlowKind::Quiz => as_json(runner, &self.quiz, request).await,
            FlowKind::Worksheet => as_json(runner, &self.worksheet, request).await,
            FlowKind::LessonPlan => as_json(runner, &self.lesson_plan, request).await,
            FlowKind::Rubric => as_json(runner, &self.rubric, request).await,
            FlowKind::Discussion => as_json(runner, &self.discussion, request).await,
            FlowKind::AdaptContent => as_json(runner, &self.adapt, request).await,
            FlowKind::MentorshipPlan => as_json(runner, &self.mentorship, request).await,
            FlowKind::ProfessionalDevelopment => as_json(runner, &self.development, request).await,
            FlowKind::EnhanceWriting => as_json(runner, &self.writing, request).await,
            FlowKind::Presentation => as_json(runner, &self.presentation, request).await,
            FlowKind::AskSahayak => as_json(runner, &self.ask, request).await,
        }
    }
}

async fn as_json<D, F>(
    runner: &FlowRunner<D>,
    flow: &F,
    request: &RawRequest,
) -> SahayakResult<FlowOutcome<Value>>
where
    D: GenerativeDriver,
    F: ContentFlow,
{
    let outcome = runner
        .run_detailed::<F::Output>(flow.spec(), request)
        .await?;
    Ok(outcome.try_map(to_value)?)
}

fn to_value<T: Serialize>(value: T) -> Result<Value, JsonError> {
    serde_json::to_value(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize flow output: {}", e)))
}
