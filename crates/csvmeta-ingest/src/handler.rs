//! Batch ingestion handler
//!
//! One invocation carries an ordered batch of S3 event records. Each record
//! runs the same linear pipeline:
//!
//! 1. locate bucket and key in the record
//! 2. fetch the object
//! 3. decode UTF-8
//! 4. summarize the CSV
//! 5. build the [`MetadataRecord`]
//! 6. upsert it into the metadata table
//! 7. publish it to the topic, when one is configured
//!
//! Records run strictly in order. The first error stops the batch: records
//! after it are never attempted, while records before it stay persisted and
//! published. [`handle`] folds the outcome into one of two fixed responses.

use std::sync::Arc;

use chrono::Utc;
use csvmeta_common::MetadataRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::{
    error::{PipelineError, PipelineResult},
    event::{self, ObjectLocation},
    metadata_store::MetadataStore,
    notify::{Notifier, NOTIFICATION_SUBJECT},
    storage::ObjectStore,
    table,
};

/// Body returned when every record in the batch succeeded
pub const SUCCESS_MESSAGE: &str = "CSV processed successfully.";

/// Body returned when any record failed
pub const FAILURE_MESSAGE: &str = "Error processing CSV file";

/// Long-lived collaborators plus the table and topic they write to
#[derive(Clone)]
pub struct IngestContext {
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    notifier: Arc<dyn Notifier>,
    table_name: String,
    topic_arn: Option<String>,
}

impl IngestContext {
    /// An empty `topic_arn` is treated the same as `None`.
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        notifier: Arc<dyn Notifier>,
        table_name: impl Into<String>,
        topic_arn: Option<String>,
    ) -> Self {
        Self {
            objects,
            metadata,
            notifier,
            table_name: table_name.into(),
            topic_arn: topic_arn.filter(|arn| !arn.is_empty()),
        }
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.topic_arn.as_deref()
    }
}

/// What a fully successful batch produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records_processed: usize,

    /// Keys in processing order
    pub filenames: Vec<String>,

    pub notifications_sent: usize,
}

/// Invocation result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// JSON-encoded string literal
    pub body: String,
}

impl InvocationResponse {
    pub fn success() -> Self {
        Self::with_message(200, SUCCESS_MESSAGE)
    }

    pub fn failure() -> Self {
        Self::with_message(500, FAILURE_MESSAGE)
    }

    fn with_message(status_code: u16, message: &str) -> Self {
        Self {
            status_code,
            body: Value::String(message.to_string()).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Invocation boundary: run the batch and map the outcome to a response.
///
/// The failure cause is logged here and only here; the caller always sees the
/// same generic failure body.
pub async fn handle(ctx: &IngestContext, event: &Value) -> InvocationResponse {
    match process_batch(ctx, event).await {
        Ok(summary) => {
            info!(
                records = summary.records_processed,
                notifications = summary.notifications_sent,
                "Batch processed"
            );
            InvocationResponse::success()
        },
        Err(err) => {
            error!(
                kind = err.kind(),
                key = err.key(),
                error = %err.chain(),
                details = ?err,
                "Error processing file"
            );
            InvocationResponse::failure()
        },
    }
}

/// Run every record of `event` through the pipeline, stopping at the first error.
#[instrument(skip_all)]
pub async fn process_batch(ctx: &IngestContext, event: &Value) -> PipelineResult<BatchSummary> {
    let records = event::records(event)?;
    debug!(records = records.len(), "Processing batch");

    let mut summary = BatchSummary::default();

    for (index, record) in records.iter().enumerate() {
        let location = event::locate(index, record)?;
        let published = process_record(ctx, &location).await?;

        summary.records_processed += 1;
        if published {
            summary.notifications_sent += 1;
        }
        summary.filenames.push(location.key);
    }

    Ok(summary)
}

/// Returns whether a notification was published.
#[instrument(skip_all, fields(bucket = %location.bucket, key = %location.key))]
async fn process_record(ctx: &IngestContext, location: &ObjectLocation) -> PipelineResult<bool> {
    let ObjectLocation { bucket, key } = location;

    let object = ctx.objects.get(bucket, key).await?;

    let text = String::from_utf8(object.content).map_err(|source| PipelineError::Decode {
        key: key.clone(),
        source,
    })?;

    let summary = table::summarize_csv(&text).map_err(|source| PipelineError::Parse {
        key: key.clone(),
        source,
    })?;
    debug!(
        columns = summary.column_names.len(),
        rows = summary.row_count,
        "Parsed CSV"
    );

    let record = MetadataRecord::build(
        key.as_str(),
        summary.column_names,
        summary.row_count,
        object.content_length,
        Utc::now(),
    );

    ctx.metadata.upsert(&ctx.table_name, &record).await?;
    info!(table = %ctx.table_name, "Stored metadata for {}", key);

    let Some(topic) = ctx.topic_arn.as_deref() else {
        return Ok(false);
    };

    let message = serde_json::to_string(&record).map_err(|e| PipelineError::Publish {
        topic: topic.to_string(),
        source: Box::new(e),
    })?;

    ctx.notifier.publish(topic, &message, NOTIFICATION_SUBJECT).await?;
    info!(topic, "Sent notification for {}", key);

    Ok(true)
}
