//! S3 event notification decoding
//!
//! Only `Records[].s3.bucket.name` and `Records[].s3.object.key` are read.
//! The outer document is decoded leniently: an event that is not an object,
//! or that has no `Records`, is an empty batch. Individual records are
//! decoded one at a time so a bad entry fails at its own position in the
//! batch, after the records before it have been handled.

use std::path::Path;

use anyhow::Context;
use aws_lambda_events::s3::S3Entity;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{PipelineError, PipelineResult};

/// Bucket and key of one storage-change record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

/// Load an event document from disk, for local invocations.
pub async fn read_event_file(path: &Path) -> anyhow::Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event file {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Event file {} is not valid JSON", path.display()))
}

/// Raw `Records` entries of an invocation event, in delivery order.
pub fn records(event: &Value) -> PipelineResult<&[Value]> {
    match event.get("Records") {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(records)) => Ok(records.as_slice()),
        Some(other) => Err(PipelineError::MalformedEvent {
            index: 0,
            reason: format!("Records must be an array, got {}", json_type(other)),
        }),
    }
}

/// Extract the bucket and key of the record at `index`.
pub fn locate(index: usize, record: &Value) -> PipelineResult<ObjectLocation> {
    let malformed = |reason: String| PipelineError::MalformedEvent { index, reason };

    let s3 = match record.get("s3") {
        Some(s3) if !s3.is_null() => {
            S3Entity::deserialize(s3).map_err(|e| malformed(format!("invalid s3: {}", e)))?
        },
        _ => return Err(malformed("missing s3".to_string())),
    };

    let bucket = s3
        .bucket
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| malformed("missing s3.bucket.name".to_string()))?;

    let key = s3
        .object
        .key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| malformed("missing s3.object.key".to_string()))?;

    Ok(ObjectLocation { bucket, key })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
