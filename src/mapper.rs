//! Synchronous mapping engine.
//!
//! A [`Mapper`] binds one [`Schema`] and executes it against input values.
//! It is stateless between calls and `Clone` is cheap (the schema is
//! shared), so one mapper can serve arbitrarily many threads at once.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{MapError, TransformError};
use crate::rule::{Rule, TransformOutput};
use crate::schema::Schema;

/// Stateless executor binding one schema to the mapping operations.
///
/// # Example
/// ```
/// use remold::{Mapper, Schema};
/// use serde_json::json;
///
/// let schema = Schema::builder()
///     .field("name", "username")
///     .transform("shout", |input, _ctx| {
///         let name = input["username"].as_str().unwrap_or("");
///         Ok(json!(name.to_uppercase()).into())
///     })
///     .build();
///
/// let mapper = Mapper::new(schema);
/// let output = mapper.map(&json!({"username": "alice"}), None).unwrap();
/// assert_eq!(output, json!({"name": "alice", "shout": "ALICE"}));
/// ```
#[derive(Debug, Clone)]
pub struct Mapper {
    schema: Arc<Schema>,
}

impl Mapper {
    /// Wrap a schema in an engine.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// The schema this engine executes.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Map one input value to one output object.
    ///
    /// A `Value::Null` input is returned unchanged (pass-through), so
    /// optional nested values can be mapped without branching at the call
    /// site. Output keys follow schema declaration order.
    ///
    /// # Errors
    /// * [`MapError::MissingContext`] if the schema requires a context and
    ///   `context` is `None`. This is checked before anything else,
    ///   including the null pass-through.
    /// * [`MapError::Transform`] if any transform rule fails; no partial
    ///   output is produced.
    pub fn map(&self, input: &Value, context: Option<&Value>) -> Result<Value, MapError> {
        if self.schema.context_required() && context.is_none() {
            return Err(MapError::MissingContext);
        }
        if input.is_null() {
            return Ok(Value::Null);
        }

        let mut output = Map::with_capacity(self.schema.len());
        for (field, rule) in self.schema.rules() {
            match rule {
                Rule::Field(source) => {
                    // Missing source fields still write an explicit null;
                    // field references never omit.
                    let value = input.get(source).cloned().unwrap_or(Value::Null);
                    output.insert(field.to_string(), value);
                }
                Rule::Transform(transform) => match transform(input, context) {
                    Ok(TransformOutput::Value(value)) => {
                        output.insert(field.to_string(), value);
                    }
                    Ok(TransformOutput::Omit) => {}
                    Err(source) => {
                        return Err(MapError::Transform {
                            field: field.to_string(),
                            source,
                        });
                    }
                },
            }
        }
        tracing::trace!(fields = output.len(), "mapped input value");
        Ok(Value::Object(output))
    }

    /// Map a slice of inputs, preserving order. All-or-nothing: the first
    /// failure aborts the batch.
    ///
    /// The context requirement is checked for the batch call itself, so an
    /// empty input still fails when the schema requires a context and none
    /// is supplied.
    pub fn map_all(&self, inputs: &[Value], context: Option<&Value>) -> Result<Vec<Value>, MapError> {
        let outputs = self.map_iter(inputs.iter().cloned(), context)?;
        tracing::debug!(count = outputs.len(), "mapped value batch");
        Ok(outputs)
    }

    /// Map any finite iterable of inputs, preserving iteration order. Same
    /// context contract as [`map_all`](Self::map_all).
    pub fn map_iter<I>(&self, inputs: I, context: Option<&Value>) -> Result<Vec<Value>, MapError>
    where
        I: IntoIterator<Item = Value>,
    {
        if self.schema.context_required() && context.is_none() {
            return Err(MapError::MissingContext);
        }
        let inputs = inputs.into_iter();
        let mut outputs = Vec::with_capacity(inputs.size_hint().0);
        for input in inputs {
            outputs.push(self.map(&input, context)?);
        }
        Ok(outputs)
    }

    /// Expose this engine as a transform-shaped [`Rule`].
    ///
    /// The rule maps the outer input with this engine's schema, passing the
    /// outer context through, so a whole mapper can sit in another schema's
    /// field slot. Inner mapping errors surface as transform errors.
    pub fn as_rule(&self) -> Rule {
        let mapper = self.clone();
        Rule::transform(move |input, context| {
            mapper
                .map(input, context)
                .map(TransformOutput::Value)
                .map_err(TransformError::custom)
        })
    }
}
