//! Object store access
//!
//! [`ObjectStore`] is the read side the pipeline needs; [`S3ObjectStore`] backs
//! it with `aws-sdk-s3` and folds SDK failures into the pipeline taxonomy.

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::get_object::GetObjectError,
    Client,
};
use tracing::{debug, instrument};

use crate::error::{PipelineError, PipelineResult};

/// Raw object bytes plus the length the store reported for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_length: u64,
}

impl StoredObject {
    /// Object whose reported length is its byte count
    pub fn new(content: Vec<u8>) -> Self {
        let content_length = content.len() as u64;
        Self {
            content,
            content_length,
        }
    }
}

/// Trait for object retrieval (dependency injection)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, bucket: &str, key: &str) -> PipelineResult<StoredObject>;
}

#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> PipelineResult<StoredObject> {
        debug!("Downloading s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_get_error(bucket, key, e))?;

        let reported_length = response.content_length();

        let content = response
            .body
            .collect()
            .await
            .map_err(|e| PipelineError::StoreUnavailable {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: Box::new(e),
            })?
            .into_bytes()
            .to_vec();

        let content_length = reported_length
            .and_then(|len| u64::try_from(len).ok())
            .unwrap_or(content.len() as u64);

        debug!(
            bytes = content.len(),
            content_length, "Downloaded s3://{}/{}", bucket, key
        );

        Ok(StoredObject {
            content,
            content_length,
        })
    }
}

/// Map a `GetObject` failure onto not-found / access-denied / unavailable.
fn classify_get_error<R>(bucket: &str, key: &str, err: SdkError<GetObjectError, R>) -> PipelineError
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = match &err {
        SdkError::ServiceError(service) if service.err().is_no_such_key() => ErrorCode::NotFound,
        SdkError::ServiceError(service) => service
            .err()
            .code()
            .map(ErrorCode::from_code)
            .unwrap_or(ErrorCode::Other),
        _ => ErrorCode::Other,
    };

    let bucket = bucket.to_string();
    let key = key.to_string();
    let source: Box<dyn std::error::Error + Send + Sync> =
        DisplayErrorContext(err).to_string().into();

    match code {
        ErrorCode::NotFound => PipelineError::ObjectNotFound {
            bucket,
            key,
            source: Some(source),
        },
        ErrorCode::AccessDenied => PipelineError::AccessDenied {
            bucket,
            key,
            source: Some(source),
        },
        ErrorCode::Other => PipelineError::StoreUnavailable {
            bucket,
            key,
            source,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCode {
    NotFound,
    AccessDenied,
    Other,
}

impl ErrorCode {
    fn from_code(code: &str) -> Self {
        match code {
            "NoSuchKey" | "NoSuchBucket" | "NotFound" | "404" => ErrorCode::NotFound,
            "AccessDenied" | "Forbidden" | "403" | "AllAccessDisabled" => ErrorCode::AccessDenied,
            _ => ErrorCode::Other,
        }
    }
}
