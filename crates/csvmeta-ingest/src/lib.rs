//! CSV Metadata Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Event-driven metadata extraction for CSV objects landing in S3:
//! fetch, parse, derive metadata, persist to DynamoDB, notify over SNS.
//!
//! # Example
//!
//! ```no_run
//! use csvmeta_ingest::{clients, config::{self, IngestConfig}, handler};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     config::load_env_file(None)?;
//!     let config = IngestConfig::from_env()?;
//!     let ctx = clients::build_context(&config).await;
//!
//!     let event = json!({
//!         "Records": [
//!             { "s3": { "bucket": { "name": "uploads" }, "object": { "key": "people.csv" } } }
//!         ]
//!     });
//!
//!     let response = handler::handle(&ctx, &event).await;
//!     println!("{}", serde_json::to_string(&response)?);
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod metadata_store;
pub mod notify;
pub mod storage;
pub mod table;

pub use error::{PipelineError, PipelineResult};
pub use handler::{handle, process_batch, BatchSummary, IngestContext, InvocationResponse};
