//! Stock convenience transforms.
//!
//! Each constructor returns a ready-made [`Rule`] that can be plugged into
//! any schema field. Async schemas accept them too, via the `From<Rule>`
//! lift.
//!
//! # Example
//! ```
//! use remold::{transforms, Mapper, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .rule("version", transforms::constant(json!(2)))
//!     .rule("legacy_id", transforms::omit())
//!     .rule("name", transforms::pick("username"))
//!     .build();
//!
//! let output = Mapper::new(schema)
//!     .map(&json!({"username": "ada"}), None)
//!     .unwrap();
//! assert_eq!(output, json!({"version": 2, "name": "ada"}));
//! ```

use serde_json::Value;

use crate::rule::{Rule, TransformOutput};

/// Always produces `value`, regardless of input or context.
pub fn constant(value: Value) -> Rule {
    Rule::transform(move |_input, _context| Ok(TransformOutput::Value(value.clone())))
}

/// Always produces the omission marker: the field never appears in the
/// output.
pub fn omit() -> Rule {
    Rule::transform(|_input, _context| Ok(TransformOutput::Omit))
}

/// Always writes an explicit null under the field name.
pub fn to_null() -> Rule {
    Rule::transform(|_input, _context| Ok(TransformOutput::Value(Value::Null)))
}

/// Always produces the "no value" form.
///
/// JSON has no undefined distinct from null, so the observable result is
/// omission: the key is absent from the output, exactly as an undefined
/// field disappears under serialization. Use [`to_null`] when the key
/// should be present with a null value.
pub fn to_absent() -> Rule {
    omit()
}

/// Field reference expressed as a transform, for slots that only accept
/// callables. Behaves like a plain field reference: never omits, and a
/// missing source field yields an explicit null.
pub fn pick(source: impl Into<String>) -> Rule {
    let source = source.into();
    Rule::transform(move |input, _context| {
        Ok(TransformOutput::Value(
            input.get(&source).cloned().unwrap_or(Value::Null),
        ))
    })
}
