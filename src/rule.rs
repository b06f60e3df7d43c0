//! Mapping rules and the omission marker.
//!
//! A [`Rule`] describes how one output field is produced: either by copying
//! a named field off the input, or by running a transform callable against
//! the full input/context pair. Transforms report their result through
//! [`TransformOutput`], whose `Omit` variant drops the field from the output
//! entirely.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::TransformError;

/// Result of a transform callable: a concrete value, or the omission marker.
///
/// `Omit` is the engine's "drop this field" signal. It is distinct from
/// `Value(Value::Null)`: null is written into the output under the field
/// name, while `Omit` leaves the key out of the output object altogether.
/// No [`Value`] can collide with it, and it is never serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    /// A value to write under the output field name.
    Value(Value),
    /// Skip the field; it does not appear in the output at all.
    Omit,
}

impl TransformOutput {
    /// Whether this output is the omission marker.
    pub fn is_omit(&self) -> bool {
        matches!(self, TransformOutput::Omit)
    }
}

impl From<Value> for TransformOutput {
    fn from(value: Value) -> Self {
        TransformOutput::Value(value)
    }
}

/// `Some(v)` becomes a value, `None` becomes the omission marker.
impl From<Option<Value>> for TransformOutput {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(value) => TransformOutput::Value(value),
            None => TransformOutput::Omit,
        }
    }
}

/// Signature of a synchronous transform callable.
///
/// Receives the full input value and the optional context; both are
/// read-only and must not be mutated through interior means. The engine
/// does not assume transforms are side-effect-free, and never memoizes or
/// deduplicates calls.
pub type TransformFn =
    dyn Fn(&Value, Option<&Value>) -> Result<TransformOutput, TransformError> + Send + Sync;

/// One output field's mapping rule.
///
/// Exactly one variant per rule. `Clone` shares the underlying transform by
/// reference, so a rule extracted from one schema can be inserted verbatim
/// into another.
#[derive(Clone)]
pub enum Rule {
    /// Copy the named input field verbatim. Never omits: a missing or null
    /// source field still writes an explicit null.
    Field(String),
    /// Compute the output field from `(input, context)`.
    Transform(Arc<TransformFn>),
}

impl Rule {
    /// Rule that copies the named input field.
    pub fn field(source: impl Into<String>) -> Self {
        Rule::Field(source.into())
    }

    /// Rule backed by a transform closure.
    ///
    /// # Example
    /// ```
    /// use remold::{Rule, TransformOutput};
    /// use serde_json::json;
    ///
    /// let rule = Rule::transform(|input, _ctx| {
    ///     let name = input["name"].as_str().unwrap_or("");
    ///     Ok(json!(name.to_uppercase()).into())
    /// });
    /// assert!(matches!(rule, Rule::Transform(_)));
    /// ```
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> Result<TransformOutput, TransformError>
            + Send
            + Sync
            + 'static,
    {
        Rule::Transform(Arc::new(f))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Field(source) => f.debug_tuple("Field").field(source).finish(),
            Rule::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}
