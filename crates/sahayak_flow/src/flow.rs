//! Flow definitions.

use crate::{
    NormalizedRequest, PromptTemplate, RawRequest, Reconcile, RequestSchema, Shape, Variants,
};
use derive_getters::Getters;
use sahayak_error::{TemplateError, ValidationError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Computes a template value from a validated request.
pub type DerivedField = fn(&NormalizedRequest) -> Value;

/// Where a flow's variants come from in the normalized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSource {
    /// A list field; one keyed entry per token
    Keys(&'static str),
    /// An integer field holding the requested item count
    Items(&'static str),
    /// A text field naming the single subject
    Single(&'static str),
    /// A fixed subject label
    Fixed(&'static str),
}

impl VariantSource {
    /// Reads the variants out of `request`.
    ///
    /// Falls back to the field name when the field is absent, so a subject
    /// label always exists.
    pub fn resolve(&self, request: &NormalizedRequest) -> Variants {
        match self {
            VariantSource::Keys(field) => Variants::keys(request.list(field).unwrap_or_default()),
            VariantSource::Items(field) => Variants::Items(
                request
                    .number(field)
                    .filter(|n| *n > 0.0)
                    .map(|n| n as usize)
                    .unwrap_or(0),
            ),
            VariantSource::Single(field) => {
                Variants::Single(request.display(field).unwrap_or_else(|| field.to_string()))
            }
            VariantSource::Fixed(label) => Variants::Single(label.to_string()),
        }
    }
}

/// Everything that defines one flow apart from its Rust types.
#[derive(Debug, Clone, Getters)]
pub struct FlowSpec {
    /// Flow identifier, e.g. `quiz`
    #[getter(skip)]
    name: &'static str,
    /// One-line summary
    #[getter(skip)]
    description: &'static str,
    /// Accepted request fields
    schema: RequestSchema,
    /// Compiled prompt
    template: PromptTemplate,
    /// Expected answer shape
    shape: Shape,
    /// Where the variants come from
    variants: VariantSource,
    /// Content name used in placeholders, e.g. "Translation"
    #[getter(skip)]
    placeholder_label: &'static str,
    /// Request fields copied into fallback logs
    #[getter(skip)]
    identifying_fields: &'static [&'static str],
    /// Values computed after validation, e.g. a language name from its code
    #[getter(skip)]
    derived: Vec<(&'static str, DerivedField)>,
}

impl FlowSpec {
    /// Defines a flow, compiling its template.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if `template` is malformed.
    pub fn new(
        name: &'static str,
        template: &str,
        schema: RequestSchema,
        shape: Shape,
        variants: VariantSource,
        placeholder_label: &'static str,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            name,
            description: "",
            schema,
            template: PromptTemplate::compile(name, template)?,
            shape,
            variants,
            placeholder_label,
            identifying_fields: &[],
            derived: Vec::new(),
        })
    }

    /// Flow identifier, e.g. `quiz`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// One-line summary.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Content name used in placeholders.
    pub fn placeholder_label(&self) -> &'static str {
        self.placeholder_label
    }

    /// Request fields copied into fallback logs.
    pub fn identifying_fields(&self) -> &'static [&'static str] {
        self.identifying_fields
    }

    /// Sets the summary.
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the request fields copied into fallback logs.
    pub fn identified_by(mut self, fields: &'static [&'static str]) -> Self {
        self.identifying_fields = fields;
        self
    }

    /// Adds a field computed from the validated request. It overwrites any
    /// caller-supplied value of the same name.
    pub fn with_derived(mut self, field: &'static str, derive: DerivedField) -> Self {
        self.derived.push((field, derive));
        self
    }

    /// Validates `raw` and adds the derived fields.
    ///
    /// # Errors
    ///
    /// Returns the schema's [`ValidationError`].
    pub fn prepare(&self, raw: &RawRequest) -> Result<NormalizedRequest, ValidationError> {
        let mut request = self.schema.normalize(raw)?;
        for (field, derive) in &self.derived {
            let value = derive(&request);
            request.insert(*field, value);
        }
        Ok(request)
    }
}

/// A typed flow.
///
/// Inputs serialize to the request map the schema validates; outputs
/// deserialize from the model's JSON and know how to build placeholders.
pub trait ContentFlow: Send + Sync {
    /// Caller-facing input
    type Input: Serialize + Send + Sync;
    /// Reconciled output
    type Output: DeserializeOwned + Serialize + Reconcile + Send;

    /// The flow definition.
    fn spec(&self) -> &FlowSpec;
}
