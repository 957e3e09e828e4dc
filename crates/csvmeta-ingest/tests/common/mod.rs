//! In-memory collaborators for handler integration tests
//!
//! Each fake records the calls it receives so tests can assert on call order
//! and on which records were never attempted.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestHarness;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let harness = TestHarness::new().with_csv("in", "a.csv", "x,y\n1,2\n");
//!     let response = harness.handle(&common::s3_event(&[("in", "a.csv")])).await;
//!     assert!(response.is_success());
//! }
//! ```

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use csvmeta_common::MetadataRecord;
use csvmeta_ingest::{
    handler,
    metadata_store::MetadataStore,
    notify::Notifier,
    storage::{ObjectStore, StoredObject},
    IngestContext, InvocationResponse, PipelineError, PipelineResult,
};
use serde_json::{json, Value};

pub const TEST_TABLE: &str = "CsvMetadata";
pub const TEST_TOPIC: &str = "arn:aws:sns:us-east-1:000000000000:CsvProcessingComplete";

/// Build an S3 notification event for `(bucket, key)` pairs, in order
pub fn s3_event(objects: &[(&str, &str)]) -> Value {
    let records: Vec<Value> = objects
        .iter()
        .map(|(bucket, key)| {
            json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": bucket },
                    "object": { "key": key }
                }
            })
        })
        .collect();

    json!({ "Records": records })
}

// ============================================================================
// Object store
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    NotFound,
    AccessDenied,
    Unavailable,
}

#[derive(Clone)]
enum Entry {
    Object(StoredObject),
    Fault(Fault),
}

#[derive(Default)]
pub struct FakeObjectStore {
    entries: Mutex<HashMap<(String, String), Entry>>,
    gets: Mutex<Vec<String>>,
}

impl FakeObjectStore {
    pub fn put(&self, bucket: &str, key: &str, object: StoredObject) {
        self.entries
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), Entry::Object(object));
    }

    pub fn fail(&self, bucket: &str, key: &str, fault: Fault) {
        self.entries
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), Entry::Fault(fault));
    }

    /// Keys requested so far, in call order
    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> PipelineResult<StoredObject> {
        self.gets.lock().unwrap().push(key.to_string());

        let entry = self
            .entries
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned();

        let (bucket, key) = (bucket.to_string(), key.to_string());
        match entry {
            Some(Entry::Object(object)) => Ok(object),
            Some(Entry::Fault(Fault::AccessDenied)) => Err(PipelineError::AccessDenied {
                bucket,
                key,
                source: None,
            }),
            Some(Entry::Fault(Fault::Unavailable)) => Err(PipelineError::StoreUnavailable {
                bucket,
                key,
                source: "connection reset by peer".into(),
            }),
            Some(Entry::Fault(Fault::NotFound)) | None => Err(PipelineError::ObjectNotFound {
                bucket,
                key,
                source: None,
            }),
        }
    }
}

// ============================================================================
// Metadata store
// ============================================================================

#[derive(Default)]
pub struct FakeMetadataStore {
    tables: Mutex<HashMap<String, HashMap<String, MetadataRecord>>>,
    upserts: Mutex<Vec<String>>,
    failing_keys: Mutex<Vec<String>>,
}

impl FakeMetadataStore {
    pub fn fail_on(&self, key: &str) {
        self.failing_keys.lock().unwrap().push(key.to_string());
    }

    /// Filenames of successful upserts, in call order
    pub fn upserts(&self) -> Vec<String> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn get(&self, table: &str, key: &str) -> Option<MetadataRecord> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn upsert(&self, table_name: &str, record: &MetadataRecord) -> PipelineResult<()> {
        if self.failing_keys.lock().unwrap().contains(&record.filename) {
            return Err(PipelineError::StoreWrite {
                table: table_name.to_string(),
                key: record.filename.clone(),
                source: "ProvisionedThroughputExceededException".into(),
            });
        }

        self.tables
            .lock()
            .unwrap()
            .entry(table_name.to_string())
            .or_default()
            .insert(record.filename.clone(), record.clone());
        self.upserts.lock().unwrap().push(record.filename.clone());

        Ok(())
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub message: String,
    pub subject: String,
}

impl Published {
    pub fn record(&self) -> MetadataRecord {
        serde_json::from_str(&self.message).unwrap()
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    published: Mutex<Vec<Published>>,
    failing_keys: Mutex<Vec<String>>,
}

impl FakeNotifier {
    /// Fail publishes whose message is the record for `key`
    pub fn fail_on(&self, key: &str) {
        self.failing_keys.lock().unwrap().push(key.to_string());
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn publish(&self, topic: &str, message: &str, subject: &str) -> PipelineResult<()> {
        let record: MetadataRecord = serde_json::from_str(message).unwrap();
        if self.failing_keys.lock().unwrap().contains(&record.filename) {
            return Err(PipelineError::Publish {
                topic: topic.to_string(),
                source: "AuthorizationError".into(),
            });
        }

        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            message: message.to_string(),
            subject: subject.to_string(),
        });

        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct TestHarness {
    pub objects: Arc<FakeObjectStore>,
    pub metadata: Arc<FakeMetadataStore>,
    pub notifier: Arc<FakeNotifier>,
    topic: Option<String>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(FakeObjectStore::default()),
            metadata: Arc::new(FakeMetadataStore::default()),
            notifier: Arc::new(FakeNotifier::default()),
            topic: Some(TEST_TOPIC.to_string()),
        }
    }

    pub fn without_topic(mut self) -> Self {
        self.topic = None;
        self
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }

    pub fn with_csv(self, bucket: &str, key: &str, text: &str) -> Self {
        self.objects
            .put(bucket, key, StoredObject::new(text.as_bytes().to_vec()));
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, object: StoredObject) -> Self {
        self.objects.put(bucket, key, object);
        self
    }

    pub fn context(&self) -> IngestContext {
        IngestContext::new(
            self.objects.clone(),
            self.metadata.clone(),
            self.notifier.clone(),
            TEST_TABLE,
            self.topic.clone(),
        )
    }

    pub async fn handle(&self, event: &Value) -> InvocationResponse {
        handler::handle(&self.context(), event).await
    }
}
