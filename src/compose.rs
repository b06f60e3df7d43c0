//! Composition helpers for nested and collection-valued sub-mappings.
//!
//! Nesting is explicit: an outer schema field delegates to a second,
//! independently built engine by selecting a nested input value (and
//! optionally deriving a sub-context) from the outer input/context pair.
//! The engine never walks nested schemas automatically.
//!
//! # Example
//! ```
//! use remold::{compose, Mapper, Schema};
//! use serde_json::json;
//!
//! let address = Mapper::new(Schema::builder().field("city", "town").build());
//! let person = Schema::builder()
//!     .field("name", "name")
//!     .rule("address", compose::nested(address, |input, _ctx| input["home"].clone()))
//!     .build();
//!
//! let output = Mapper::new(person)
//!     .map(&json!({"name": "ada", "home": {"town": "london"}}), None)
//!     .unwrap();
//! assert_eq!(output, json!({"name": "ada", "address": {"city": "london"}}));
//! ```

use serde_json::Value;

use crate::async_mapper::AsyncMapper;
use crate::async_rule::AsyncRule;
use crate::error::TransformError;
use crate::mapper::Mapper;
use crate::rule::{Rule, TransformOutput};

/// Rule that selects a nested input and maps it with `mapper`, passing the
/// outer context through unchanged.
///
/// Selecting `Value::Null` (e.g. an absent nested object) produces a null
/// output field via the inner engine's pass-through, so optional nesting
/// needs no branching here.
pub fn nested<S>(mapper: Mapper, select: S) -> Rule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
{
    Rule::transform(move |input, context| {
        let nested_input = select(input, context);
        mapper
            .map(&nested_input, context)
            .map(TransformOutput::Value)
            .map_err(TransformError::custom)
    })
}

/// Like [`nested`], with a derived sub-context for the inner call.
pub fn nested_with_context<S, C>(mapper: Mapper, select: S, derive: C) -> Rule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
    C: Fn(&Value, Option<&Value>) -> Option<Value> + Send + Sync + 'static,
{
    Rule::transform(move |input, context| {
        let nested_input = select(input, context);
        let sub_context = derive(input, context);
        mapper
            .map(&nested_input, sub_context.as_ref())
            .map(TransformOutput::Value)
            .map_err(TransformError::custom)
    })
}

/// Rule that selects a nested sequence and maps each element with `mapper`.
///
/// The selected value must be an array (mapped element-wise, order kept) or
/// null (passed through); anything else is a transform error.
pub fn nested_each<S>(mapper: Mapper, select: S) -> Rule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
{
    Rule::transform(move |input, context| {
        let selected = select(input, context);
        match selected {
            Value::Null => Ok(TransformOutput::Value(Value::Null)),
            Value::Array(items) => {
                let mapped = mapper
                    .map_iter(items, context)
                    .map_err(TransformError::custom)?;
                Ok(TransformOutput::Value(Value::Array(mapped)))
            }
            other => Err(TransformError::Message(format!(
                "nested_each expected an array or null, got {}",
                type_name(&other)
            ))),
        }
    })
}

/// Async counterpart of [`nested`].
pub fn nested_async<S>(mapper: AsyncMapper, select: S) -> AsyncRule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
{
    AsyncRule::transform(move |input: Value, context: Option<Value>| {
        let nested_input = select(&input, context.as_ref());
        let mapper = mapper.clone();
        async move {
            mapper
                .map(&nested_input, context.as_ref())
                .await
                .map(TransformOutput::Value)
                .map_err(TransformError::custom)
        }
    })
}

/// Async counterpart of [`nested_with_context`].
pub fn nested_with_context_async<S, C>(mapper: AsyncMapper, select: S, derive: C) -> AsyncRule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
    C: Fn(&Value, Option<&Value>) -> Option<Value> + Send + Sync + 'static,
{
    AsyncRule::transform(move |input: Value, context: Option<Value>| {
        let nested_input = select(&input, context.as_ref());
        let sub_context = derive(&input, context.as_ref());
        let mapper = mapper.clone();
        async move {
            mapper
                .map(&nested_input, sub_context.as_ref())
                .await
                .map(TransformOutput::Value)
                .map_err(TransformError::custom)
        }
    })
}

/// Async counterpart of [`nested_each`]. Elements of an indexable selected
/// array are mapped concurrently; order is preserved.
pub fn nested_each_async<S>(mapper: AsyncMapper, select: S) -> AsyncRule
where
    S: Fn(&Value, Option<&Value>) -> Value + Send + Sync + 'static,
{
    AsyncRule::transform(move |input: Value, context: Option<Value>| {
        let selected = select(&input, context.as_ref());
        let mapper = mapper.clone();
        async move {
            match selected {
                Value::Null => Ok(TransformOutput::Value(Value::Null)),
                Value::Array(items) => {
                    let mapped = mapper
                        .map_all(&items, context.as_ref())
                        .await
                        .map_err(TransformError::custom)?;
                    Ok(TransformOutput::Value(Value::Array(mapped)))
                }
                other => Err(TransformError::Message(format!(
                    "nested_each expected an array or null, got {}",
                    type_name(&other)
                ))),
            }
        }
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
