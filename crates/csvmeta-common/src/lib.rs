//! CSV Metadata Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types and logging setup for the CSV metadata workspace.
//!
//! # Overview
//!
//! - **Types**: the [`MetadataRecord`](types::MetadataRecord) persisted for every ingested CSV object
//! - **Logging**: centralized `tracing` subscriber configuration
//!
//! # Example
//!
//! ```no_run
//! use chrono::Utc;
//! use csvmeta_common::types::MetadataRecord;
//!
//! let record = MetadataRecord::build(
//!     "uploads/people.csv",
//!     vec!["name".to_string(), "age".to_string()],
//!     2,
//!     24,
//!     Utc::now(),
//! );
//! assert_eq!(record.column_count, 2);
//! ```

pub mod logging;
pub mod types;

pub use types::MetadataRecord;
