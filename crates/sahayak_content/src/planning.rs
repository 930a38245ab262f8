//! Lesson, mentorship and professional development plans.

use crate::common::{any_grade, unavailable};
use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, NormalizedRequest, Property, Reconcile, RequestSchema, Shape,
    VariantSource, Variants,
};
use serde::{Deserialize, Serialize};

const LESSON_PLAN_TEMPLATE: &str = "\
You design K-12 lessons. Plan one lesson from the details below.

Topic: {{topic}}
Grade level: {{gradeLevel}}
Duration: {{durationInMinutes}} minutes
Learning objectives:
{{#each learningObjectives}}- {{this}}
{{/each}}
The plan needs a title, the objectives it serves, the materials to prepare \
and an ordered list of activities. Each activity has a name, a description of \
what students do and its length in minutes; together they should fill the \
lesson. Open with a hook and close with a wrap-up or short check for \
understanding.";

const MENTORSHIP_TEMPLATE: &str = "\
You are an educational psychologist who mentors K-12 students. A teacher asks \
for a mentorship plan.

Student: {{studentName}}
Grade level: {{gradeLevel}}

Grade summary
Average grade: {{gradeAnalysis.averageGrade}}%
Grades recorded: {{gradeAnalysis.totalGrades}}
Trend: {{gradeAnalysis.gradeTrend}}
Strong subjects: {{#each gradeAnalysis.subjectStrengths}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}
Weak subjects: {{#each gradeAnalysis.subjectWeaknesses}}{{this}}{{#unless @last}}, {{/unless}}{{/each}}

Grade history
{{#each gradeData}}- {{subject}}: {{grade}}% on {{date}} ({{className}})
{{/each}}
Challenges observed by the teacher
{{#each problems}}- {{this}}
{{/each}}
Recent progress: \"{{progress}}\"

Write a plan with a short title, three or four achievable goals informed by \
the grades and the challenges, concrete activities the teacher can run (name \
and description each) aimed at the weak areas while using the strengths, and \
guidance on the academic and behavioural signs to watch when checking \
progress. Keep the tone supportive and practical.";

const PROFESSIONAL_DEVELOPMENT_TEMPLATE: &str = "\
You coach teachers through their own professional growth.

Learning goal: {{learningGoal}}

Write a plan with a concise title, the key concepts the teacher should \
understand and two or three steps. Each step has a title, a short \
description, two or three strategies the teacher can apply in class, and a \
specific English YouTube search query an educator would use to find good \
videos on it (\"formative assessment exit tickets\" rather than \"how to \
check learning\").";

/// Input of [`LessonPlanFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct LessonPlanRequest {
    topic: String,
    grade_level: u32,
    /// Lesson length, 10 to 240 minutes
    duration_in_minutes: u32,
    learning_objectives: Vec<String>,
}

impl LessonPlanRequest {
    /// Creates a builder.
    pub fn builder() -> LessonPlanRequestBuilder {
        LessonPlanRequestBuilder::default()
    }
}

/// One timed lesson activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct LessonActivity {
    name: String,
    description: String,
    /// Minutes
    duration: f64,
}

/// A generated lesson plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct LessonPlan {
    title: String,
    objectives: Vec<String>,
    materials: Vec<String>,
    activities: Vec<LessonActivity>,
}

impl Reconcile for LessonPlan {
    fn placeholder(variants: &Variants, label: &str, request: &NormalizedRequest) -> Self {
        Self {
            title: unavailable(label, variants),
            objectives: request
                .list("learningObjectives")
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
            materials: Vec::new(),
            activities: Vec::new(),
        }
    }
}

/// Timed lesson plan for a topic and grade.
pub struct LessonPlanFlow {
    spec: FlowSpec,
}

impl LessonPlanFlow {
    /// Flow name.
    pub const NAME: &'static str = "lesson_plan";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let activity = Shape::object([
            Property::new("name", Shape::String).describe("e.g. Introduction, Group work"),
            Property::new("description", Shape::String),
            Property::new("duration", Shape::Number).describe("Minutes"),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            LESSON_PLAN_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("topic"),
                any_grade(),
                FieldSpec::integer("durationInMinutes", Some(10), Some(240)),
                FieldSpec::list("learningObjectives"),
            ]),
            Shape::object([
                Property::new("title", Shape::String),
                Property::new("objectives", Shape::strings()),
                Property::new("materials", Shape::strings()),
                Property::new("activities", Shape::array(activity)),
            ]),
            VariantSource::Single("topic"),
            "Lesson plan",
        )?
        .with_description("Timed lesson plan with objectives, materials and activities")
        .identified_by(&["topic", "gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for LessonPlanFlow {
    type Input = LessonPlanRequest;
    type Output = LessonPlan;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// One recorded grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GradeRecord {
    subject: String,
    /// Percentage, 0 to 100
    grade: f64,
    date: String,
    class_name: String,
}

impl GradeRecord {
    /// Creates a builder.
    pub fn builder() -> GradeRecordBuilder {
        GradeRecordBuilder::default()
    }
}

/// Summary statistics over a student's grades.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(default, setter(into))]
pub struct GradeAnalysis {
    average_grade: f64,
    subject_strengths: Vec<String>,
    subject_weaknesses: Vec<String>,
    /// improving, declining or stable
    grade_trend: String,
    total_grades: u32,
}

impl GradeAnalysis {
    /// Creates a builder.
    pub fn builder() -> GradeAnalysisBuilder {
        GradeAnalysisBuilder::default()
    }

    /// Computes the analysis from raw grade records.
    ///
    /// Subjects averaging at least 80 are strengths, below 60 weaknesses.
    /// The trend compares the mean of the later half of the records with
    /// the earlier half; a difference under five points is stable.
    pub fn from_records(records: &[GradeRecord]) -> Self {
        if records.is_empty() {
            return Self {
                grade_trend: "stable".to_string(),
                ..Self::default()
            };
        }

        let mean = |grades: &[GradeRecord]| {
            grades.iter().map(|r| r.grade).sum::<f64>() / grades.len().max(1) as f64
        };

        let mut subjects: Vec<(String, Vec<f64>)> = Vec::new();
        for record in records {
            match subjects.iter_mut().find(|(s, _)| *s == record.subject) {
                Some((_, grades)) => grades.push(record.grade),
                None => subjects.push((record.subject.clone(), vec![record.grade])),
            }
        }
        let subject_mean =
            |grades: &Vec<f64>| grades.iter().sum::<f64>() / grades.len().max(1) as f64;

        let (earlier, later) = records.split_at(records.len() / 2);
        let grade_trend = if earlier.is_empty() {
            "stable"
        } else {
            let delta = mean(later) - mean(earlier);
            if delta >= 5.0 {
                "improving"
            } else if delta <= -5.0 {
                "declining"
            } else {
                "stable"
            }
        };

        Self {
            average_grade: (mean(records) * 10.0).round() / 10.0,
            subject_strengths: subjects
                .iter()
                .filter(|(_, g)| subject_mean(g) >= 80.0)
                .map(|(s, _)| s.clone())
                .collect(),
            subject_weaknesses: subjects
                .iter()
                .filter(|(_, g)| subject_mean(g) < 60.0)
                .map(|(s, _)| s.clone())
                .collect(),
            grade_trend: grade_trend.to_string(),
            total_grades: records.len() as u32,
        }
    }
}

/// Input of [`MentorshipPlanFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct MentorshipPlanRequest {
    student_name: String,
    grade_level: u32,
    /// Challenges observed by the teacher
    problems: Vec<String>,
    /// Recent progress or strengths
    progress: String,
    grade_data: Vec<GradeRecord>,
    grade_analysis: GradeAnalysis,
}

impl MentorshipPlanRequest {
    /// Creates a builder.
    pub fn builder() -> MentorshipPlanRequestBuilder {
        MentorshipPlanRequestBuilder::default()
    }

    /// Builds a request whose grade analysis is computed from `grade_data`.
    pub fn from_history(
        student_name: impl Into<String>,
        grade_level: u32,
        problems: Vec<String>,
        progress: impl Into<String>,
        grade_data: Vec<GradeRecord>,
    ) -> Self {
        Self {
            student_name: student_name.into(),
            grade_level,
            problems,
            progress: progress.into(),
            grade_analysis: GradeAnalysis::from_records(&grade_data),
            grade_data,
        }
    }
}

/// Suggested intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct MentorshipActivity {
    name: String,
    description: String,
}

/// A generated mentorship plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipPlan {
    plan_title: String,
    goals: Vec<String>,
    suggested_activities: Vec<MentorshipActivity>,
    progress_check: String,
}

impl Reconcile for MentorshipPlan {
    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            plan_title: unavailable(label, variants),
            goals: Vec::new(),
            suggested_activities: Vec::new(),
            progress_check: String::new(),
        }
    }
}

/// Data-informed mentorship plan for one student.
pub struct MentorshipPlanFlow {
    spec: FlowSpec,
}

impl MentorshipPlanFlow {
    /// Flow name.
    pub const NAME: &'static str = "mentorship_plan";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let activity = Shape::object([
            Property::new("name", Shape::String),
            Property::new("description", Shape::String),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            MENTORSHIP_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("studentName"),
                any_grade(),
                FieldSpec::list("problems"),
                FieldSpec::text("progress"),
                FieldSpec::json("gradeData"),
                FieldSpec::json("gradeAnalysis"),
            ]),
            Shape::object([
                Property::new("planTitle", Shape::String),
                Property::new("goals", Shape::strings()),
                Property::new("suggestedActivities", Shape::array(activity)),
                Property::new("progressCheck", Shape::String),
            ]),
            VariantSource::Single("studentName"),
            "Mentorship plan",
        )?
        .with_description("Mentorship plan from grades and teacher observations")
        .identified_by(&["studentName", "gradeLevel"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for MentorshipPlanFlow {
    type Input = MentorshipPlanRequest;
    type Output = MentorshipPlan;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

/// Input of [`ProfessionalDevelopmentFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct ProfessionalDevelopmentRequest {
    /// Skill or topic the teacher wants to learn
    learning_goal: String,
}

impl ProfessionalDevelopmentRequest {
    /// Creates a builder.
    pub fn builder() -> ProfessionalDevelopmentRequestBuilder {
        ProfessionalDevelopmentRequestBuilder::default()
    }
}

/// One step of a development plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentStep {
    title: String,
    description: String,
    strategies: Vec<String>,
    youtube_search_query: String,
}

/// A generated professional development plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalDevelopmentPlan {
    plan_title: String,
    key_concepts: Vec<String>,
    suggested_steps: Vec<DevelopmentStep>,
}

impl Reconcile for ProfessionalDevelopmentPlan {
    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            plan_title: unavailable(label, variants),
            key_concepts: Vec::new(),
            suggested_steps: Vec::new(),
        }
    }
}

/// Self-study plan for a teacher's learning goal.
pub struct ProfessionalDevelopmentFlow {
    spec: FlowSpec,
}

impl ProfessionalDevelopmentFlow {
    /// Flow name.
    pub const NAME: &'static str = "professional_development";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let step = Shape::object([
            Property::new("title", Shape::String),
            Property::new("description", Shape::String),
            Property::new("strategies", Shape::strings()),
            Property::new("youtubeSearchQuery", Shape::String),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            PROFESSIONAL_DEVELOPMENT_TEMPLATE,
            RequestSchema::new(vec![FieldSpec::text("learningGoal")]),
            Shape::object([
                Property::new("planTitle", Shape::String),
                Property::new("keyConcepts", Shape::strings()),
                Property::new("suggestedSteps", Shape::array(step)),
            ]),
            VariantSource::Single("learningGoal"),
            "Professional development plan",
        )?
        .with_description("Professional development plan for a teacher")
        .identified_by(&["learningGoal"]);
        Ok(Self { spec })
    }
}

impl ContentFlow for ProfessionalDevelopmentFlow {
    type Input = ProfessionalDevelopmentRequest;
    type Output = ProfessionalDevelopmentPlan;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(subject: &str, grade: f64) -> GradeRecord {
        GradeRecord::builder()
            .subject(subject)
            .grade(grade)
            .date("2024-01-10")
            .class_name("7B")
            .build()
            .unwrap()
    }

    #[test]
    fn analysis_finds_strengths_weaknesses_and_trend() {
        let records = vec![
            record("Math", 50.0),
            record("Science", 85.0),
            record("Math", 55.0),
            record("Science", 80.0),
        ];
        let analysis = GradeAnalysis::from_records(&records);

        assert_eq!(analysis.subject_strengths(), &vec!["Science".to_string()]);
        assert_eq!(analysis.subject_weaknesses(), &vec!["Math".to_string()]);
        assert_eq!(*analysis.total_grades(), 4);
        assert_eq!(*analysis.average_grade(), 67.5);
        assert_eq!(analysis.grade_trend(), "stable");
    }

    #[test]
    fn analysis_detects_improvement() {
        let records = vec![record("Math", 40.0), record("Math", 70.0)];
        assert_eq!(GradeAnalysis::from_records(&records).grade_trend(), "improving");
    }

    #[test]
    fn empty_history_is_stable() {
        let analysis = GradeAnalysis::from_records(&[]);
        assert_eq!(analysis.grade_trend(), "stable");
        assert_eq!(*analysis.total_grades(), 0);
    }
}
