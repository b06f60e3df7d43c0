//! Asynchronous mapping engine.
//!
//! Same contract as the synchronous [`Mapper`](crate::Mapper), except that
//! transform rules return futures. Within one `map` call all transform
//! rules run concurrently; the engine waits for every one of them and then
//! assembles the output in schema declaration order, so field order never
//! depends on completion order. Any failing transform fails the whole call;
//! in-flight siblings are dropped and their results discarded.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::async_rule::AsyncRule;
use crate::error::{MapError, SchemaShapeError, TransformError};
use crate::rule::TransformOutput;
use crate::schema::Schema;

/// Immutable mapping from output field name to [`AsyncRule`].
///
/// Built through [`AsyncSchema::builder`], or lifted from a synchronous
/// [`Schema`] with `From`.
#[derive(Debug, Clone)]
pub struct AsyncSchema {
    rules: IndexMap<String, AsyncRule>,
    context_required: bool,
}

impl AsyncSchema {
    /// Start building an async schema.
    pub fn builder() -> AsyncSchemaBuilder {
        AsyncSchemaBuilder {
            rules: IndexMap::new(),
            context_required: false,
        }
    }

    /// Iterate `(output field, rule)` pairs in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &AsyncRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Look up the rule for one output field.
    pub fn rule(&self, field: &str) -> Option<&AsyncRule> {
        self.rules.get(field)
    }

    /// Number of output fields.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the schema has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a rule exists for the given output field.
    pub fn contains(&self, field: &str) -> bool {
        self.rules.contains_key(field)
    }

    /// Whether mapping calls must supply a context value.
    pub fn context_required(&self) -> bool {
        self.context_required
    }
}

impl From<Schema> for AsyncSchema {
    fn from(schema: Schema) -> Self {
        let context_required = schema.context_required();
        let rules = schema
            .rules()
            .map(|(field, rule)| (field.to_string(), AsyncRule::from(rule.clone())))
            .collect();
        Self {
            rules,
            context_required,
        }
    }
}

/// Builder for [`AsyncSchema`]. Same replacement and ordering semantics as
/// the synchronous [`SchemaBuilder`](crate::SchemaBuilder).
#[derive(Debug, Clone)]
pub struct AsyncSchemaBuilder {
    rules: IndexMap<String, AsyncRule>,
    context_required: bool,
}

impl AsyncSchemaBuilder {
    /// Field-reference rule: copy `source` off the input into `field`.
    pub fn field(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.rules.insert(field.into(), AsyncRule::field(source));
        self
    }

    /// Transform rule backed by an async closure.
    pub fn transform<F, Fut>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TransformOutput, TransformError>> + Send + 'static,
    {
        self.rules.insert(field.into(), AsyncRule::transform(f));
        self
    }

    /// Insert a prebuilt rule; sync rules lift via `Into`.
    pub fn rule(mut self, field: impl Into<String>, rule: impl Into<AsyncRule>) -> Self {
        self.rules.insert(field.into(), rule.into());
        self
    }

    /// Copy the named rules out of an existing async schema.
    pub fn pick(mut self, source: &AsyncSchema, fields: &[&str]) -> Self {
        for field in fields {
            if let Some(rule) = source.rule(field) {
                self.rules.insert((*field).to_string(), rule.clone());
            }
        }
        self
    }

    /// Declare that mapping calls must supply a context value.
    pub fn require_context(mut self) -> Self {
        self.context_required = true;
        self
    }

    /// Build without a shape check.
    pub fn build(self) -> AsyncSchema {
        AsyncSchema {
            rules: self.rules,
            context_required: self.context_required,
        }
    }

    /// Build, verifying the rules cover `expected` exactly.
    pub fn build_checked(self, expected: &[&str]) -> Result<AsyncSchema, SchemaShapeError> {
        let missing: Vec<String> = expected
            .iter()
            .filter(|field| !self.rules.contains_key(**field))
            .map(|field| (*field).to_string())
            .collect();
        let unexpected: Vec<String> = self
            .rules
            .keys()
            .filter(|field| !expected.contains(&field.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(SchemaShapeError {
                missing,
                unexpected,
            });
        }
        Ok(self.build())
    }
}

/// Stateless async executor binding one [`AsyncSchema`].
///
/// # Example
/// ```
/// use remold::{AsyncMapper, AsyncSchema};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let schema = AsyncSchema::builder()
///     .field("id", "user_id")
///     .transform("label", |input, _ctx| async move {
///         Ok(json!(format!("user-{}", input["user_id"])).into())
///     })
///     .build();
///
/// let mapper = AsyncMapper::new(schema);
/// let output = mapper.map(&json!({"user_id": 7}), None).await.unwrap();
/// assert_eq!(output, json!({"id": 7, "label": "user-7"}));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct AsyncMapper {
    schema: Arc<AsyncSchema>,
}

impl AsyncMapper {
    /// Wrap a schema in an engine.
    pub fn new(schema: AsyncSchema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// The schema this engine executes.
    pub fn schema(&self) -> &AsyncSchema {
        &self.schema
    }

    /// Map one input value to one output object.
    ///
    /// All transform rules for the call are evaluated concurrently; output
    /// keys still follow schema declaration order. Same pass-through,
    /// context and error contract as [`Mapper::map`](crate::Mapper::map),
    /// and all-or-nothing on failure.
    pub async fn map(&self, input: &Value, context: Option<&Value>) -> Result<Value, MapError> {
        if self.schema.context_required() && context.is_none() {
            return Err(MapError::MissingContext);
        }
        if input.is_null() {
            return Ok(Value::Null);
        }

        let mut pending: Vec<BoxFuture<'static, Result<Option<Value>, MapError>>> =
            Vec::with_capacity(self.schema.len());
        for (field, rule) in self.schema.rules() {
            match rule {
                AsyncRule::Field(source) => {
                    let value = input.get(source).cloned().unwrap_or(Value::Null);
                    pending.push(Box::pin(future::ready(Ok(Some(value)))));
                }
                AsyncRule::Transform(transform) => {
                    let fut = transform(input.clone(), context.cloned());
                    let field = field.to_string();
                    pending.push(Box::pin(async move {
                        match fut.await {
                            Ok(TransformOutput::Value(value)) => Ok(Some(value)),
                            Ok(TransformOutput::Omit) => Ok(None),
                            Err(source) => Err(MapError::Transform { field, source }),
                        }
                    }));
                }
            }
        }

        let settled = future::try_join_all(pending).await?;

        let mut output = Map::with_capacity(self.schema.len());
        for ((field, _), slot) in self.schema.rules().zip(settled) {
            if let Some(value) = slot {
                output.insert(field.to_string(), value);
            }
        }
        tracing::trace!(fields = output.len(), "mapped input value");
        Ok(Value::Object(output))
    }

    /// Map a slice of inputs concurrently, preserving input order in the
    /// output regardless of completion order. All-or-nothing.
    ///
    /// The context requirement is checked for the batch call itself, so an
    /// empty input still fails when the schema requires a context and none
    /// is supplied.
    pub async fn map_all(
        &self,
        inputs: &[Value],
        context: Option<&Value>,
    ) -> Result<Vec<Value>, MapError> {
        if self.schema.context_required() && context.is_none() {
            return Err(MapError::MissingContext);
        }
        let outputs =
            future::try_join_all(inputs.iter().map(|input| self.map(input, context))).await?;
        tracing::debug!(count = outputs.len(), "mapped value batch");
        Ok(outputs)
    }

    /// Map any finite iterable of inputs, strictly sequentially.
    ///
    /// The sequential fallback exists because arbitrary iterables are not
    /// assumed indexable or re-iterable; ordering still matches iteration
    /// order. Same context contract as [`map_all`](Self::map_all).
    pub async fn map_iter<I>(
        &self,
        inputs: I,
        context: Option<&Value>,
    ) -> Result<Vec<Value>, MapError>
    where
        I: IntoIterator<Item = Value>,
    {
        if self.schema.context_required() && context.is_none() {
            return Err(MapError::MissingContext);
        }
        let inputs = inputs.into_iter();
        let mut outputs = Vec::with_capacity(inputs.size_hint().0);
        for input in inputs {
            outputs.push(self.map(&input, context).await?);
        }
        Ok(outputs)
    }

    /// Expose this engine as a transform-shaped [`AsyncRule`].
    pub fn as_rule(&self) -> AsyncRule {
        let mapper = self.clone();
        AsyncRule::transform(move |input: Value, context: Option<Value>| {
            let mapper = mapper.clone();
            async move {
                mapper
                    .map(&input, context.as_ref())
                    .await
                    .map(TransformOutput::Value)
                    .map_err(TransformError::custom)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_field_and_transform_rules() {
        let schema = AsyncSchema::builder()
            .field("out1", "in1")
            .transform("out2", |input: Value, _ctx| async move {
                Ok(json!(input["in2"].as_i64().unwrap_or(0) * 10).into())
            })
            .build();
        let output = AsyncMapper::new(schema)
            .map(&json!({"in1": "a", "in2": 4}), None)
            .await
            .unwrap();
        assert_eq!(output, json!({"out1": "a", "out2": 40}));
    }

    #[tokio::test]
    async fn test_null_input_passes_through() {
        let mapper = AsyncMapper::new(AsyncSchema::builder().field("a", "a").build());
        assert_eq!(mapper.map(&Value::Null, None).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_declaration_order_beats_completion_order() {
        let schema = AsyncSchema::builder()
            .transform("slow", |_, _| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(json!("slow").into())
            })
            .transform("fast", |_, _| async { Ok(json!("fast").into()) })
            .build();
        let output = AsyncMapper::new(schema).map(&json!({}), None).await.unwrap();
        let keys: Vec<&str> = output.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_failure_is_all_or_nothing() {
        let schema = AsyncSchema::builder()
            .field("ok", "a")
            .transform("bad", |_, _| async { Err(TransformError::from("broken")) })
            .build();
        let err = AsyncMapper::new(schema)
            .map(&json!({"a": 1}), None)
            .await
            .unwrap_err();
        match err {
            MapError::Transform { field, .. } => assert_eq!(field, "bad"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_context_rejected() {
        let schema = AsyncSchema::builder()
            .transform("out", |_, ctx: Option<Value>| async move { Ok(ctx.into()) })
            .require_context()
            .build();
        let mapper = AsyncMapper::new(schema);
        assert!(matches!(
            mapper.map(&json!({}), None).await,
            Err(MapError::MissingContext)
        ));
        let ctx = json!("side-channel");
        let output = mapper.map(&json!({}), Some(&ctx)).await.unwrap();
        assert_eq!(output, json!({"out": "side-channel"}));
    }

    #[tokio::test]
    async fn test_missing_context_rejected_for_empty_batch() {
        let schema = AsyncSchema::builder()
            .transform("out", |_, ctx: Option<Value>| async move { Ok(ctx.into()) })
            .require_context()
            .build();
        let mapper = AsyncMapper::new(schema);

        assert!(matches!(
            mapper.map_all(&[], None).await,
            Err(MapError::MissingContext)
        ));
        assert!(matches!(
            mapper.map_iter(std::iter::empty(), None).await,
            Err(MapError::MissingContext)
        ));

        let ctx = json!({});
        assert_eq!(
            mapper.map_all(&[], Some(&ctx)).await.unwrap(),
            Vec::<Value>::new()
        );
    }

    #[tokio::test]
    async fn test_map_all_preserves_order_under_latency() {
        // Later elements finish first; output order must match input order.
        let schema = AsyncSchema::builder()
            .transform("n", |input: Value, _ctx| async move {
                let n = input["n"].as_u64().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(30 - 10 * n.min(3))).await;
                Ok(json!(n).into())
            })
            .build();
        let inputs: Vec<Value> = (0..3).map(|n| json!({ "n": n })).collect();
        let outputs = AsyncMapper::new(schema).map_all(&inputs, None).await.unwrap();
        assert_eq!(outputs, vec![json!({"n": 0}), json!({"n": 1}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn test_lifted_sync_schema() {
        let sync_schema = Schema::builder()
            .field("out1", "in1")
            .transform("out2", |input, _ctx| Ok(input["in2"].clone().into()))
            .build();
        let mapper = AsyncMapper::new(AsyncSchema::from(sync_schema));
        let output = mapper.map(&json!({"in1": 1, "in2": 2}), None).await.unwrap();
        assert_eq!(output, json!({"out1": 1, "out2": 2}));
    }

    #[tokio::test]
    async fn test_async_pick_copies_selected_rules() {
        let base = AsyncSchema::builder()
            .field("keep", "src")
            .transform("doubled", |input: Value, _ctx| async move {
                Ok(json!(input["n"].as_i64().unwrap_or(0) * 2).into())
            })
            .field("drop", "other")
            .build();

        let derived = AsyncSchema::builder()
            .pick(&base, &["keep", "doubled", "nonexistent"])
            .field("extra", "more")
            .build();

        assert!(derived.contains("keep"));
        assert!(derived.contains("doubled"));
        assert!(derived.contains("extra"));
        assert!(!derived.contains("drop"));
        assert!(!derived.contains("nonexistent"));

        // Shared fields behave identically under both schemas.
        let input = json!({"src": "s", "n": 21, "other": 1, "more": 2});
        let out_base = AsyncMapper::new(base).map(&input, None).await.unwrap();
        let out_derived = AsyncMapper::new(derived).map(&input, None).await.unwrap();
        assert_eq!(out_base["keep"], out_derived["keep"]);
        assert_eq!(out_base["doubled"], out_derived["doubled"]);
        assert_eq!(out_derived["extra"], json!(2));
    }

    #[tokio::test]
    async fn test_async_build_checked() {
        let err = AsyncSchema::builder()
            .field("a", "a")
            .build_checked(&["a", "b"])
            .unwrap_err();
        assert_eq!(err.missing, vec!["b".to_string()]);
        assert!(err.unexpected.is_empty());
    }
}
