//! Configuration management

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ============================================================================
// Defaults (LocalStack edge port)
// ============================================================================

pub const DEFAULT_S3_ENDPOINT: &str = "http://localhost:4566";

pub const DEFAULT_DYNAMODB_ENDPOINT: &str = "http://localhost:4566";

pub const DEFAULT_SNS_ENDPOINT: &str = "http://localhost:4566";

pub const DEFAULT_TABLE_NAME: &str = "CsvMetadata";

pub const DEFAULT_TOPIC_ARN: &str = "arn:aws:sns:us-east-1:000000000000:CsvProcessingComplete";

pub const DEFAULT_REGION: &str = "us-east-1";

/// Ingestion handler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub aws: AwsConfig,
    pub metadata: MetadataConfig,
    pub notification: NotificationConfig,
}

/// Endpoints and region the AWS clients bind to.
///
/// `None` endpoints fall back to the SDK's regional AWS endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub s3_endpoint: Option<String>,
    pub s3_path_style: bool,
    pub dynamodb_endpoint: Option<String>,
    pub sns_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub table_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Publishing is skipped entirely when unset
    pub topic_arn: Option<String>,
}

impl IngestConfig {
    /// Build configuration from the process environment only
    pub fn from_env() -> anyhow::Result<Self> {
        let config = IngestConfig {
            aws: AwsConfig {
                region: std::env::var("AWS_REGION")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                s3_endpoint: endpoint_var("S3_ENDPOINT", DEFAULT_S3_ENDPOINT),
                s3_path_style: std::env::var("S3_PATH_STYLE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
                dynamodb_endpoint: endpoint_var("DYNAMODB_ENDPOINT", DEFAULT_DYNAMODB_ENDPOINT),
                sns_endpoint: endpoint_var("SNS_ENDPOINT", DEFAULT_SNS_ENDPOINT),
            },
            metadata: MetadataConfig {
                table_name: std::env::var("DYNAMODB_TABLE")
                    .unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string()),
            },
            notification: NotificationConfig {
                // Unset means the default topic; set-but-empty disables publishing.
                topic_arn: match std::env::var("SNS_TOPIC_ARN") {
                    Ok(arn) if arn.is_empty() => None,
                    Ok(arn) => Some(arn),
                    Err(_) => Some(DEFAULT_TOPIC_ARN.to_string()),
                },
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.metadata.table_name.trim().is_empty() {
            anyhow::bail!("DYNAMODB_TABLE cannot be empty");
        }

        if self.aws.region.trim().is_empty() {
            anyhow::bail!("AWS region cannot be empty");
        }

        for (name, endpoint) in [
            ("S3_ENDPOINT", &self.aws.s3_endpoint),
            ("DYNAMODB_ENDPOINT", &self.aws.dynamodb_endpoint),
            ("SNS_ENDPOINT", &self.aws.sns_endpoint),
        ] {
            if let Some(url) = endpoint {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("{} must be an http(s) URL, got {}", name, url);
                }
            }
        }

        Ok(())
    }
}

/// Merge a dotenv file into the process environment.
///
/// With no `path`, a `.env` in the working directory or its parents is used
/// if one exists. An explicit `path` must be readable. Variables already set
/// in the process environment are never overwritten.
pub fn load_env_file(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file {}", path.display())),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        },
    }
}

/// Unset picks `default`; set-but-empty means "use the AWS endpoint".
fn endpoint_var(name: &str, default: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value),
        Err(_) => Some(default.to_string()),
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            aws: AwsConfig {
                region: DEFAULT_REGION.to_string(),
                s3_endpoint: Some(DEFAULT_S3_ENDPOINT.to_string()),
                s3_path_style: true,
                dynamodb_endpoint: Some(DEFAULT_DYNAMODB_ENDPOINT.to_string()),
                sns_endpoint: Some(DEFAULT_SNS_ENDPOINT.to_string()),
            },
            metadata: MetadataConfig {
                table_name: DEFAULT_TABLE_NAME.to_string(),
            },
            notification: NotificationConfig {
                topic_arn: Some(DEFAULT_TOPIC_ARN.to_string()),
            },
        }
    }
}
