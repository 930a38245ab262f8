//! Teaching content flows.
//!
//! Each flow pairs a typed request and output with a prompt, an output
//! shape and a placeholder strategy, and runs through
//! [`sahayak_flow::FlowRunner`]. [`Catalog`] exposes them by name.
//!
//! | Flow | Output | Placeholder |
//! |---|---|---|
//! | `multi_language_content` | text per language | per language |
//! | `localized_content` | text per language | per language |
//! | `quiz` | [`Quiz`] | per question |
//! | `worksheet` | [`Worksheet`] | per question |
//! | `lesson_plan` | [`LessonPlan`] | whole plan |
//! | `rubric` | [`Rubric`] | per criterion |
//! | `discussion` | [`DiscussionMaterial`] | whole set |
//! | `adapt_content` | [`AdaptedContent`] | whole text |
//! | `mentorship_plan` | [`MentorshipPlan`] | whole plan |
//! | `professional_development` | [`ProfessionalDevelopmentPlan`] | whole plan |
//! | `enhance_writing` | [`WritingFeedback`] | original text, no suggestions |
//! | `presentation` | [`Presentation`] | per slide |
//! | `ask_sahayak` | [`Explanation`] | whole answer |

mod assessment;
mod catalog;
mod classroom;
mod common;
mod explain;
mod localization;
mod planning;
mod writing;

pub use assessment::{
    Criterion, PerformanceLevel, QuestionType, Quiz, QuizFlow, QuizQuestion, QuizRequest,
    QuizRequestBuilder, Rubric, RubricFlow, RubricRequest, RubricRequestBuilder, Worksheet,
    WorksheetFlow, WorksheetQuestion, WorksheetRequest, WorksheetRequestBuilder,
};
pub use catalog::{Catalog, FlowKind};
pub use classroom::{
    AdaptContentFlow, AdaptContentRequest, AdaptContentRequestBuilder, AdaptedContent,
    DiscussionFlow, DiscussionMaterial, DiscussionRequest, DiscussionRequestBuilder, Presentation,
    PresentationFlow, PresentationRequest, PresentationRequestBuilder, Slide, Viewpoint,
    VocabularyEntry,
};
pub use explain::{
    AskSahayakFlow, AskSahayakRequest, AskSahayakRequestBuilder, EXPLANATION_LANGUAGES, Explanation,
    language_name,
};
pub use localization::{
    LocalizedContentFlow, LocalizedContentRequest, LocalizedContentRequestBuilder,
    MultiLanguageFlow, MultiLanguageRequest, MultiLanguageRequestBuilder,
};
pub use planning::{
    DevelopmentStep, GradeAnalysis, GradeAnalysisBuilder, GradeRecord, GradeRecordBuilder,
    LessonActivity, LessonPlan, LessonPlanFlow, LessonPlanRequest, LessonPlanRequestBuilder,
    MentorshipActivity, MentorshipPlan, MentorshipPlanFlow, MentorshipPlanRequest,
    MentorshipPlanRequestBuilder, ProfessionalDevelopmentFlow, ProfessionalDevelopmentPlan,
    ProfessionalDevelopmentRequest, ProfessionalDevelopmentRequestBuilder,
};
pub use writing::{
    EnhanceWritingFlow, EnhanceWritingRequest, EnhanceWritingRequestBuilder, WritingFeedback,
    WritingSuggestion,
};
