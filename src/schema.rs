//! Schema: an ordered, immutable mapping from output field names to rules.
//!
//! A schema is built once (typically at startup), wrapped in a
//! [`Mapper`](crate::Mapper), and shared for the life of the process. Rule
//! iteration order is the builder's declaration order, and that order is
//! what the engine writes output keys in.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{SchemaShapeError, TransformError};
use crate::rule::{Rule, TransformOutput};

/// Immutable mapping from output field name to [`Rule`].
///
/// Construct through [`Schema::builder`]. Rules can be read back out for
/// reuse in other schemas (see [`Schema::rule`] and
/// [`SchemaBuilder::pick`]).
///
/// # Example
/// ```
/// use remold::Schema;
/// use serde_json::json;
///
/// let schema = Schema::builder()
///     .field("out1", "in1")
///     .transform("out2", |input, _ctx| Ok(input["in2"].clone().into()))
///     .build();
/// assert_eq!(schema.len(), 2);
/// assert!(schema.contains("out1"));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    rules: IndexMap<String, Rule>,
    context_required: bool,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            rules: IndexMap::new(),
            context_required: false,
        }
    }

    /// Iterate `(output field, rule)` pairs in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Look up the rule for one output field.
    pub fn rule(&self, field: &str) -> Option<&Rule> {
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

/// Builder for [`Schema`].
///
/// Declaring the same output field twice replaces the earlier rule; the
/// field keeps its first declared position.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    rules: IndexMap<String, Rule>,
    context_required: bool,
}

impl SchemaBuilder {
    /// Field-reference rule: copy `source` off the input into `field`.
    pub fn field(mut self, field: impl Into<String>, source: impl Into<String>) -> Self {
        self.rules.insert(field.into(), Rule::field(source));
        self
    }

    /// Transform rule backed by a closure.
    pub fn transform<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> Result<TransformOutput, TransformError>
            + Send
            + Sync
            + 'static,
    {
        self.rules.insert(field.into(), Rule::transform(f));
        self
    }

    /// Insert a prebuilt rule, e.g. one read out of another schema.
    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Copy the named rules out of an existing schema.
    ///
    /// Names the source schema lacks are skipped; a later
    /// [`build_checked`](Self::build_checked) reports them as missing. This
    /// is the selective form of schema reuse; copying a whole rule map
    /// wholesale can smuggle fields the new output shape does not want.
    pub fn pick(mut self, source: &Schema, fields: &[&str]) -> Self {
        for field in fields {
            if let Some(rule) = source.rule(field) {
                self.rules.insert((*field).to_string(), rule.clone());
            }
        }
        self
    }

    /// Declare that mapping calls must supply a context value.
    ///
    /// Engines reject calls without one with
    /// [`MapError::MissingContext`](crate::MapError::MissingContext).
    pub fn require_context(mut self) -> Self {
        self.context_required = true;
        self
    }

    /// Build without a shape check.
    ///
    /// Use when the output shape is not enumerable up front; prefer
    /// [`build_checked`](Self::build_checked) when it is.
    pub fn build(self) -> Schema {
        Schema {
            rules: self.rules,
            context_required: self.context_required,
        }
    }

    /// Build, verifying the rules cover `expected` exactly.
    ///
    /// Every expected field must have a rule and no rule may name a field
    /// outside `expected`; otherwise no schema is created and the error
    /// lists both the missing and the unexpected names.
    pub fn build_checked(self, expected: &[&str]) -> Result<Schema, SchemaShapeError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declaration_order_preserved() {
        let schema = Schema::builder()
            .field("z", "a")
            .field("a", "b")
            .field("m", "c")
            .build();

        let order: Vec<&str> = schema.rules().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_field_keeps_position_replaces_rule() {
        let schema = Schema::builder()
            .field("first", "a")
            .field("second", "b")
            .field("first", "c")
            .build();

        let order: Vec<&str> = schema.rules().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["first", "second"]);
        match schema.rule("first") {
            Some(Rule::Field(source)) => assert_eq!(source, "c"),
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn test_build_checked_exact_cover() {
        let schema = Schema::builder()
            .field("out1", "in1")
            .transform("out2", |_, _| Ok(json!(1).into()))
            .build_checked(&["out1", "out2"])
            .unwrap();
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_build_checked_reports_missing_and_unexpected() {
        let err = Schema::builder()
            .field("out1", "in1")
            .field("stray", "in2")
            .build_checked(&["out1", "out2"])
            .unwrap_err();

        assert_eq!(err.missing, vec!["out2".to_string()]);
        assert_eq!(err.unexpected, vec!["stray".to_string()]);
    }

    #[test]
    fn test_pick_copies_selected_rules() {
        let base = Schema::builder()
            .field("keep", "src")
            .field("drop", "other")
            .build();

        let derived = Schema::builder()
            .pick(&base, &["keep", "nonexistent"])
            .field("extra", "more")
            .build();

        assert!(derived.contains("keep"));
        assert!(derived.contains("extra"));
        assert!(!derived.contains("drop"));
        assert!(!derived.contains("nonexistent"));
    }

    #[test]
    fn test_require_context_flag() {
        let plain = Schema::builder().field("a", "a").build();
        let required = Schema::builder().field("a", "a").require_context().build();
        assert!(!plain.context_required());
        assert!(required.context_required());
    }
}
