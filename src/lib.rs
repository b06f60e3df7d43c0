//! # Remold: Schema-Driven Object Mapping
//!
//! Remold transforms one JSON-like value into another through a declarative
//! [`Schema`]: every output field is mapped either from a named input field
//! or by a transform callable that sees the full input plus an optional
//! read-only context. The same schema model runs under a synchronous
//! [`Mapper`] or an asynchronous [`AsyncMapper`] whose transforms are
//! awaited concurrently.
//!
//! ## Features
//!
//! - **Declarative schemas**: one rule per output field, iterated in
//!   declaration order; output key order matches.
//! - **Omission semantics**: transforms can drop a field entirely via
//!   [`TransformOutput::Omit`], which is distinct from writing a null.
//! - **Null pass-through**: mapping a null input yields null, so optional
//!   nested values need no branching.
//! - **Composition**: rules are reusable across schemas, whole engines can
//!   act as rules ([`Mapper::as_rule`]), and the [`compose`] helpers handle
//!   nested objects and collections with derived sub-contexts.
//! - **Checked construction**: [`SchemaBuilder::build_checked`] verifies a
//!   schema covers an output shape exactly, rejecting missing and extra
//!   fields alike.
//!
//! ## Example
//!
//! ```
//! use remold::{transforms, Mapper, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .field("title", "headline")
//!     .transform("slug", |input, _ctx| {
//!         let headline = input["headline"].as_str().unwrap_or("");
//!         Ok(json!(headline.to_lowercase().replace(' ', "-")).into())
//!     })
//!     .rule("format", transforms::constant(json!("v2")))
//!     .build_checked(&["title", "slug", "format"])
//!     .unwrap();
//!
//! let mapper = Mapper::new(schema);
//! let output = mapper
//!     .map(&json!({"headline": "Hello World", "draft": true}), None)
//!     .unwrap();
//! assert_eq!(
//!     output,
//!     json!({"title": "Hello World", "slug": "hello-world", "format": "v2"})
//! );
//! ```
//!
//! ## Async example
//!
//! ```
//! use remold::{AsyncMapper, AsyncSchema};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let schema = AsyncSchema::builder()
//!     .field("id", "id")
//!     .transform("profile", |input, _ctx| async move {
//!         // e.g. fetch from a remote service
//!         Ok(json!({"for": input["id"]}).into())
//!     })
//!     .build();
//!
//! let mapper = AsyncMapper::new(schema);
//! let output = mapper.map(&json!({"id": 1}), None).await.unwrap();
//! assert_eq!(output, json!({"id": 1, "profile": {"for": 1}}));
//! # });
//! ```

// Core modules
pub mod error;
pub mod rule;
pub mod schema;

// Engines
pub mod mapper;

// Async variants
pub mod async_mapper;
pub mod async_rule;

// Stock transforms and composition helpers
pub mod compose;
pub mod transforms;

// Re-export key types
pub use async_mapper::{AsyncMapper, AsyncSchema, AsyncSchemaBuilder};
pub use async_rule::{AsyncRule, AsyncTransformFn};
pub use error::{MapError, SchemaShapeError, TransformError};
pub use mapper::Mapper;
pub use rule::{Rule, TransformFn, TransformOutput};
pub use schema::{Schema, SchemaBuilder};
