//! Pieces shared by the flow definitions.

use sahayak_flow::{FieldSpec, Variants, placeholder_text};

/// Highest school grade the flows accept where a grade is bounded.
pub(crate) const MAX_GRADE: i64 = 12;

/// `gradeLevel`, bounded to school grades.
pub(crate) fn school_grade() -> FieldSpec {
    FieldSpec::integer("gradeLevel", Some(1), Some(MAX_GRADE))
}

/// `gradeLevel` with no bounds.
pub(crate) fn any_grade() -> FieldSpec {
    FieldSpec::integer("gradeLevel", None, None)
}

/// Label of the single subject, or an empty string.
pub(crate) fn subject(variants: &Variants) -> String {
    variants.labels().into_iter().next().unwrap_or_default()
}

/// Placeholder text for the single subject.
pub(crate) fn unavailable(label: &str, variants: &Variants) -> String {
    placeholder_text(label, &subject(variants))
}
