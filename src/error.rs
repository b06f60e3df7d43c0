//! Error types for schema construction and mapping execution.
//!
//! All errors are surfaced to the immediate caller; the engine performs no
//! internal recovery, retry, or logging of failures.

use std::error::Error;
use std::fmt;

/// Error returned by a transform callable.
///
/// Transforms built from plain closures usually return
/// [`TransformError::Message`]; transforms that call fallible code can wrap
/// the original error with [`TransformError::custom`] so it stays reachable
/// through [`Error::source`].
#[derive(Debug)]
pub enum TransformError {
    /// A plain failure message.
    Message(String),
    /// An arbitrary caller error, propagated unchanged.
    Custom(Box<dyn Error + Send + Sync>),
}

impl TransformError {
    /// Wrap any error type as a transform error.
    pub fn custom<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        TransformError::Custom(Box::new(err))
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Message(msg) => write!(f, "{}", msg),
            TransformError::Custom(err) => write!(f, "{}", err),
        }
    }
}

impl Error for TransformError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TransformError::Message(_) => None,
            TransformError::Custom(err) => Some(err.as_ref()),
        }
    }
}

impl From<String> for TransformError {
    fn from(msg: String) -> Self {
        TransformError::Message(msg)
    }
}

impl From<&str> for TransformError {
    fn from(msg: &str) -> Self {
        TransformError::Message(msg.to_string())
    }
}

/// Error raised by checked schema construction when the declared rules do
/// not exactly cover the expected output fields.
///
/// Both directions are reported: expected fields with no rule, and rules for
/// fields the output shape does not contain. The schema is not created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaShapeError {
    /// Expected output fields that have no rule.
    pub missing: Vec<String>,
    /// Rule names not present in the expected output shape.
    pub unexpected: Vec<String>,
}

impl fmt::Display for SchemaShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema does not match output shape")?;
        if !self.missing.is_empty() {
            write!(f, "; missing fields: {}", self.missing.join(", "))?;
        }
        if !self.unexpected.is_empty() {
            write!(f, "; unexpected fields: {}", self.unexpected.join(", "))?;
        }
        Ok(())
    }
}

impl Error for SchemaShapeError {}

/// Error raised by a mapping call.
#[derive(Debug)]
pub enum MapError {
    /// The schema declares a context requirement and no context was supplied.
    MissingContext,
    /// A transform rule failed; the whole call fails and no partial output
    /// is produced.
    Transform {
        /// Output field whose transform failed.
        field: String,
        /// The transform's own error, unchanged.
        source: TransformError,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MissingContext => {
                write!(f, "schema requires a context but none was supplied")
            }
            MapError::Transform { field, source } => {
                write!(f, "transform for field '{}' failed: {}", field, source)
            }
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MapError::MissingContext => None,
            MapError::Transform { source, .. } => Some(source),
        }
    }
}
