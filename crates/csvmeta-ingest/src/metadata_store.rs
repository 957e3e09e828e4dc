//! Metadata persistence

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, Client};
use csvmeta_common::MetadataRecord;
use serde_dynamo::{to_item, Item};
use tracing::instrument;

use crate::error::{PipelineError, PipelineResult};

/// Trait for keyed metadata writes (dependency injection)
///
/// `upsert` is insert-or-replace keyed by `record.filename`; an existing
/// record for the same key is overwritten whole.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upsert(&self, table_name: &str, record: &MetadataRecord) -> PipelineResult<()>;
}

#[derive(Clone, Debug)]
pub struct DynamoMetadataStore {
    client: Client,
}

impl DynamoMetadataStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    #[instrument(skip(self, record), fields(key = %record.filename))]
    async fn upsert(&self, table_name: &str, record: &MetadataRecord) -> PipelineResult<()> {
        let write_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            PipelineError::StoreWrite {
                table: table_name.to_string(),
                key: record.filename.clone(),
                source,
            }
        };

        let item: Item = to_item(record).map_err(|e| write_error(Box::new(e)))?;

        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.into()))
            .send()
            .await
            .map_err(|e| write_error(DisplayErrorContext(e).to_string().into()))?;

        Ok(())
    }
}
