//! Completion notifications

use async_trait::async_trait;
use aws_sdk_sns::{error::DisplayErrorContext, Client};
use tracing::instrument;

use crate::error::{PipelineError, PipelineResult};

/// Subject line of every completion notification
pub const NOTIFICATION_SUBJECT: &str = "CSV Processing Complete";

/// Trait for broadcast notifications (dependency injection)
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> PipelineResult<()>;
}

#[derive(Clone, Debug)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    #[instrument(skip(self, message))]
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> PipelineResult<()> {
        self.client
            .publish()
            .topic_arn(topic)
            .message(message)
            .subject(subject)
            .send()
            .await
            .map_err(|e| PipelineError::Publish {
                topic: topic.to_string(),
                source: DisplayErrorContext(e).to_string().into(),
            })?;

        Ok(())
    }
}
