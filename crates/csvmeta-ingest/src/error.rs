//! Pipeline error types

use thiserror::Error;

use crate::table::TableError;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way a single event record can fail.
///
/// All variants are terminal for the invocation: the first one raised stops
/// the batch and turns into the generic failure response.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed event record #{index}: {reason}")]
    MalformedEvent { index: usize, reason: String },

    #[error("Object not found: s3://{bucket}/{key}")]
    ObjectNotFound {
        bucket: String,
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Access denied: s3://{bucket}/{key}")]
    AccessDenied {
        bucket: String,
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Object store unavailable while reading s3://{bucket}/{key}")]
    StoreUnavailable {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Object {key} is not valid UTF-8")]
    Decode {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to parse {key} as CSV")]
    Parse {
        key: String,
        #[source]
        source: TableError,
    },

    #[error("Failed to write metadata for {key} to table {table}")]
    StoreWrite {
        table: String,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to publish notification to {topic}")]
    Publish {
        topic: String,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// Short tag used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MalformedEvent { .. } => "malformed_event",
            PipelineError::ObjectNotFound { .. } => "object_not_found",
            PipelineError::AccessDenied { .. } => "access_denied",
            PipelineError::StoreUnavailable { .. } => "store_unavailable",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Parse { .. } => "parse",
            PipelineError::StoreWrite { .. } => "store_write",
            PipelineError::Publish { .. } => "publish",
        }
    }

    /// Object key the failure relates to, when one was known.
    pub fn key(&self) -> Option<&str> {
        match self {
            PipelineError::MalformedEvent { .. } | PipelineError::Publish { .. } => None,
            PipelineError::ObjectNotFound { key, .. }
            | PipelineError::AccessDenied { key, .. }
            | PipelineError::StoreUnavailable { key, .. }
            | PipelineError::Decode { key, .. }
            | PipelineError::Parse { key, .. }
            | PipelineError::StoreWrite { key, .. } => Some(key),
        }
    }

    /// Render the error followed by its `source()` chain on one line.
    pub fn chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}
