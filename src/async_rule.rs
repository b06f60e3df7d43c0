//! Asynchronous mapping rules.
//!
//! Mirrors [`Rule`](crate::Rule) for transforms that return futures. Async
//! transforms take owned copies of the input and context so their futures
//! can outlive the borrow of the call site; the engine clones per
//! invocation and never mutates caller data.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::TransformError;
use crate::rule::{Rule, TransformOutput};

/// Signature of an asynchronous transform callable.
pub type AsyncTransformFn = dyn Fn(Value, Option<Value>) -> BoxFuture<'static, Result<TransformOutput, TransformError>>
    + Send
    + Sync;

/// One output field's rule for the async engine.
#[derive(Clone)]
pub enum AsyncRule {
    /// Copy the named input field verbatim; never omits.
    Field(String),
    /// Compute the output field from `(input, context)`, asynchronously.
    Transform(Arc<AsyncTransformFn>),
}

impl AsyncRule {
    /// Rule that copies the named input field.
    pub fn field(source: impl Into<String>) -> Self {
        AsyncRule::Field(source.into())
    }

    /// Rule backed by an async closure.
    ///
    /// # Example
    /// ```
    /// use remold::AsyncRule;
    /// use serde_json::json;
    ///
    /// let rule = AsyncRule::transform(|input, _ctx| async move {
    ///     Ok(json!(input["n"].as_i64().unwrap_or(0) * 2).into())
    /// });
    /// assert!(matches!(rule, AsyncRule::Transform(_)));
    /// ```
    pub fn transform<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TransformOutput, TransformError>> + Send + 'static,
    {
        AsyncRule::Transform(Arc::new(move |input, context| {
            let fut: BoxFuture<'static, _> = Box::pin(f(input, context));
            fut
        }))
    }
}

/// Lift a synchronous rule into the async engine. Sync transforms run
/// inline as already-resolved futures.
impl From<Rule> for AsyncRule {
    fn from(rule: Rule) -> Self {
        match rule {
            Rule::Field(source) => AsyncRule::Field(source),
            Rule::Transform(transform) => AsyncRule::Transform(Arc::new(move |input, context| {
                let result = transform(&input, context.as_ref());
                let fut: BoxFuture<'static, _> = Box::pin(futures::future::ready(result));
                fut
            })),
        }
    }
}

impl fmt::Debug for AsyncRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncRule::Field(source) => f.debug_tuple("Field").field(source).finish(),
            AsyncRule::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_async_transform_invocation() {
        let rule = AsyncRule::transform(|input: Value, _ctx| async move {
            Ok(input["n"].clone().into())
        });
        let AsyncRule::Transform(f) = &rule else {
            panic!("expected transform rule");
        };
        let result = f(json!({"n": 5}), None).await.unwrap();
        assert_eq!(result, TransformOutput::Value(json!(5)));
    }

    #[tokio::test]
    async fn test_lifted_sync_rule_behaves_identically() {
        let sync_rule = Rule::transform(|input, _ctx| {
            Ok(json!(input["n"].as_i64().unwrap_or(0) + 1).into())
        });
        let lifted = AsyncRule::from(sync_rule);
        let AsyncRule::Transform(f) = &lifted else {
            panic!("expected transform rule");
        };
        let result = f(json!({"n": 41}), None).await.unwrap();
        assert_eq!(result, TransformOutput::Value(json!(42)));
    }

    #[test]
    fn test_lifted_field_rule_stays_field() {
        let lifted = AsyncRule::from(Rule::field("in1"));
        assert!(matches!(lifted, AsyncRule::Field(ref s) if s == "in1"));
    }
}
