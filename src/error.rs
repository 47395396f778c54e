//! Error types for datapipe.
//!
//! [`PipelineError`] is the only error that crosses the pipeline boundary.
//! Failures raised by user functions are wrapped into it by the stage that
//! invoked the function; failures that already are a `PipelineError` pass
//! through untouched so their original attribution survives.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Boxed error returned by user-supplied predicates and transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Uniform failure surfaced by a pipeline.
#[derive(Error, Debug)]
#[error("{message}{}", fmt_stage(.stage))]
pub struct PipelineError {
    message: String,
    stage: Option<String>,
    element: Option<OffendingElement>,
    #[source]
    cause: Option<BoxError>,
}

fn fmt_stage(stage: &Option<String>) -> String {
    match stage {
        Some(name) => format!(" (stage: {name})"),
        None => String::new(),
    }
}

impl PipelineError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: None,
            element: None,
            cause: None,
        }
    }

    /// Create an error that wraps `cause` and carries the element that
    /// triggered it.
    pub fn nested<T>(message: impl Into<String>, element: T, cause: BoxError) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            stage: None,
            element: Some(OffendingElement::new(element)),
            cause: Some(cause),
        }
    }

    /// Attach a nested cause.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attribute the error to `stage` unless it is already attributed.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        if self.stage.is_none() {
            self.stage = Some(stage.into());
        }
        self
    }

    /// Classify a user-function fault.
    ///
    /// A fault that already is a `PipelineError` is returned as-is. Anything
    /// else becomes a new error attributed to `stage`, with `element` moved
    /// into it and the fault kept as the nested cause.
    pub fn from_fault<T>(fault: BoxError, message: &str, stage: &str, element: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        match fault.downcast::<PipelineError>() {
            Ok(err) => *err,
            Err(other) => Self::nested(message, element, other).with_stage(stage),
        }
    }

    /// The error message, without stage attribution.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the stage that raised the error, if known.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// The nested cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Whether the error wraps a nested cause.
    pub fn is_nested(&self) -> bool {
        self.cause.is_some()
    }

    /// Whether the error carries an offending element.
    pub fn has_element(&self) -> bool {
        self.element.is_some()
    }

    /// Borrow the offending element if it is a `T`.
    pub fn element<T: 'static>(&self) -> Option<&T> {
        self.element.as_ref()?.value.downcast_ref::<T>()
    }

    /// Debug rendering of the offending element, if any.
    pub fn element_repr(&self) -> Option<&str> {
        self.element.as_ref().map(|e| e.repr.as_str())
    }

    /// Move the offending element out of the error if it is a `T`.
    ///
    /// The element stays in place when the type does not match.
    pub fn take_element<T: 'static>(&mut self) -> Option<T> {
        let element = self.element.take()?;
        match element.value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => {
                self.element = Some(OffendingElement {
                    value,
                    repr: element.repr,
                });
                None
            }
        }
    }
}

impl From<TapeError> for PipelineError {
    fn from(err: TapeError) -> Self {
        PipelineError::new("The position tape is corrupt.").with_cause(err)
    }
}

/// Type-erased element moved into a [`PipelineError`].
struct OffendingElement {
    value: Box<dyn Any + Send + Sync>,
    repr: String,
}

impl OffendingElement {
    fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        let repr = format!("{value:?}");
        Self {
            value: Box::new(value),
            repr,
        }
    }
}

impl fmt::Debug for OffendingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

/// Failure while reading or decoding a position tape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TapeError {
    /// A read went past the last recorded field.
    #[error("tape exhausted: no field at offset {offset}")]
    Exhausted {
        /// Offset of the missing field.
        offset: usize,
    },

    /// The recorded field has a different type than the reader expected.
    #[error("tape field at offset {offset} is {found}, expected {expected}")]
    TypeMismatch {
        /// Offset of the field.
        offset: usize,
        /// Expected field type.
        expected: &'static str,
        /// Recorded field type.
        found: &'static str,
    },

    /// A recorded position is out of range for the stage reloading it.
    #[error("invalid position {position} for stage {stage}")]
    InvalidPosition {
        /// Stage kind.
        stage: &'static str,
        /// Recorded position.
        position: u64,
    },

    /// The tape was recorded by a differently-composed pipeline.
    #[error("tape was recorded by pipeline shape '{found}', expected '{expected}'")]
    ShapeMismatch {
        /// Shape of the pipeline reloading the tape.
        expected: String,
        /// Shape recorded on the tape.
        found: String,
    },

    /// Encoded tape bytes failed validation.
    #[error("tape codec error: {0}")]
    Codec(String),
}
