//! AWS client construction
//!
//! Clients are built once at process start and shared by every invocation.
//! SDK-level retries are turned off: a failed call fails the record.

use std::sync::Arc;

use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};
use tracing::{debug, info};

use crate::{
    config::{AwsConfig, IngestConfig},
    handler::IngestContext,
    metadata_store::DynamoMetadataStore,
    notify::SnsNotifier,
    storage::S3ObjectStore,
};

/// Load the shared SDK configuration (credentials chain, region, retry policy)
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}

pub fn s3_client(sdk: &SdkConfig, config: &AwsConfig) -> aws_sdk_s3::Client {
    let mut s3_builder = aws_sdk_s3::config::Builder::from(sdk);
    s3_builder.set_endpoint_url(config.s3_endpoint.clone());
    let s3_config = s3_builder.force_path_style(config.s3_path_style).build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

pub fn dynamodb_client(sdk: &SdkConfig, config: &AwsConfig) -> aws_sdk_dynamodb::Client {
    let mut dynamodb_builder = aws_sdk_dynamodb::config::Builder::from(sdk);
    dynamodb_builder.set_endpoint_url(config.dynamodb_endpoint.clone());
    let dynamodb_config = dynamodb_builder.build();

    aws_sdk_dynamodb::Client::from_conf(dynamodb_config)
}

pub fn sns_client(sdk: &SdkConfig, config: &AwsConfig) -> aws_sdk_sns::Client {
    let mut sns_builder = aws_sdk_sns::config::Builder::from(sdk);
    sns_builder.set_endpoint_url(config.sns_endpoint.clone());
    let sns_config = sns_builder.build();

    aws_sdk_sns::Client::from_conf(sns_config)
}

/// Wire S3, DynamoDB and SNS into a handler context
pub async fn build_context(config: &IngestConfig) -> IngestContext {
    debug!("Initializing AWS clients with config: {:?}", config.aws);

    let sdk = load_sdk_config(&config.aws).await;

    let context = IngestContext::new(
        Arc::new(S3ObjectStore::new(s3_client(&sdk, &config.aws))),
        Arc::new(DynamoMetadataStore::new(dynamodb_client(&sdk, &config.aws))),
        Arc::new(SnsNotifier::new(sns_client(&sdk, &config.aws))),
        config.metadata.table_name.clone(),
        config.notification.topic_arn.clone(),
    );

    info!(
        region = %config.aws.region,
        table = %config.metadata.table_name,
        topic = ?config.notification.topic_arn,
        "AWS clients initialized"
    );

    context
}
