//! Prompt template error types.

use derive_more::{Display, Error};

/// Ways a prompt template can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum TemplateErrorKind {
    /// Block helper opened but never closed.
    #[display("Unclosed block '{{{{#{}}}}}'", _0)]
    UnclosedBlock(String),

    /// Closing tag does not match the innermost open block.
    #[display("Expected '{{{{/{}}}}}', found '{{{{/{}}}}}'", expected, found)]
    MismatchedClose {
        /// Helper that is currently open
        expected: String,
        /// Helper named by the closing tag
        found: String,
    },

    /// Closing tag with no open block.
    #[display("Unexpected closing tag '{{{{/{}}}}}'", _0)]
    UnexpectedClose(String),

    /// `{{else}}` outside an `#if`/`#unless` block.
    #[display("'{{{{else}}}}' outside of a conditional block")]
    StrayElse,

    /// Block helper that the renderer does not know.
    #[display("Unknown block helper '{}'", _0)]
    UnknownHelper(String),

    /// Placeholder with no expression inside.
    #[display("Empty placeholder at byte {}", _0)]
    EmptyExpression(usize),
}

/// Template error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Template Error in '{}': {} at line {} in {}", template, kind, line, file)]
pub struct TemplateError {
    /// Name of the template that failed to compile
    pub template: String,
    /// The specific error kind
    pub kind: TemplateErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl TemplateError {
    /// Creates a new error with automatic location tracking.
    #[track_caller]
    pub fn new(template: impl Into<String>, kind: TemplateErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            template: template.into(),
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
