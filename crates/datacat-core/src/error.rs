//! Error types for readers, catalogs and pipelines.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for datacat operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse categories of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A key, index, entry or method was not found at execution time.
    NotFound,
    /// Arguments or pipeline structure were invalid.
    InvalidInput,
    /// The value does not support the requested operation.
    Unsupported,
    /// An external reader or transformation failed.
    Execution,
    /// Configuration was rejected.
    Configuration,
    /// Serialization/deserialization failed.
    Serialization,
}

/// Errors raised while building or materializing readers and pipelines.
///
/// Lookups that miss while a pipeline is being *built* are never errors:
/// they become generic steps and fail here, at `read()` time, if at all.
#[derive(Debug, Error)]
pub enum Error {
    /// Named key missing from a mapping or catalog.
    #[error("key not found: {key}")]
    KeyNotFound {
        /// The missing key.
        key: String,
    },

    /// Positional index outside of a sequence.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: i64,
        /// Length of the indexed sequence.
        len: usize,
    },

    /// Value cannot be indexed with the given key.
    #[error("{value_kind} value cannot be indexed by {key}")]
    NotIndexable {
        /// Kind of the indexed value.
        value_kind: &'static str,
        /// The rejected key.
        key: String,
    },

    /// No method with this name is known for the materialized value.
    #[error("unknown method: {name}")]
    UnknownMethod {
        /// The requested method name.
        name: String,
    },

    /// Reflective method call fallback refused by the dispatch policy.
    #[error("generic call to method {name} is not allowed")]
    GenericCallDenied {
        /// The refused method name.
        name: String,
    },

    /// Name belongs to a member every source exposes directly and is never
    /// dispatched.
    #[error("{name} is a native member and is not dispatched")]
    NativeMember {
        /// The requested member name.
        name: String,
    },

    /// A step that needs an upstream value was run without one.
    #[error("step {step} requires an input value")]
    MissingInput {
        /// Position of the step in its pipeline.
        step: usize,
    },

    /// Arguments passed to an operation were invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Pipeline structure violates its invariants.
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Failure raised by an external reader or transformation.
    #[error("execution failed: {message}")]
    Execution {
        /// Error message.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates an execution error with a message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an execution error wrapping a source error.
    pub fn from_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a key-not-found error.
    pub fn key_not_found(key: impl ToString) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound { .. } | Self::IndexOutOfBounds { .. } | Self::UnknownMethod { .. } => {
                ErrorKind::NotFound
            }
            Self::NotIndexable { .. } | Self::GenericCallDenied { .. } => ErrorKind::Unsupported,
            Self::NativeMember { .. }
            | Self::MissingInput { .. }
            | Self::InvalidArgument(_)
            | Self::InvalidPipeline(_) => ErrorKind::InvalidInput,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind().into()
    }
}
