//! Common types used across the CSV metadata workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `strftime` pattern for [`MetadataRecord::upload_timestamp`].
pub const UPLOAD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Descriptive metadata computed for one CSV object.
///
/// `filename` is the object key and doubles as the table's primary key, so
/// writing a record for a key that already exists replaces it wholesale.
///
/// Field order is the order of the JSON notification message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub filename: String,

    /// UTC time the record was computed, not the object's upload time
    pub upload_timestamp: String,

    pub file_size_bytes: u64,

    /// Data rows, header excluded
    pub row_count: u64,

    pub column_count: u64,

    pub column_names: Vec<String>,
}

impl MetadataRecord {
    /// Build a record from parsed table facts.
    ///
    /// `column_count` is derived from `column_names`, never supplied.
    pub fn build(
        filename: impl Into<String>,
        column_names: Vec<String>,
        row_count: u64,
        file_size_bytes: u64,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: filename.into(),
            upload_timestamp: computed_at.format(UPLOAD_TIMESTAMP_FORMAT).to_string(),
            file_size_bytes,
            row_count,
            column_count: column_names.len() as u64,
            column_names,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
    }

    #[test]
    fn test_build_derives_column_count() {
        let record = MetadataRecord::build(
            "data/sample.csv",
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            2,
            18,
            fixed_instant(),
        );

        assert_eq!(record.filename, "data/sample.csv");
        assert_eq!(record.column_count, 3);
        assert_eq!(record.column_count as usize, record.column_names.len());
        assert_eq!(record.row_count, 2);
        assert_eq!(record.file_size_bytes, 18);
    }

    #[test]
    fn test_timestamp_format() {
        let record = MetadataRecord::build("x.csv", vec![], 0, 0, fixed_instant());
        assert_eq!(record.upload_timestamp, "2024-03-09 07:05:02");
    }

    #[test]
    fn test_json_field_order() {
        let record = MetadataRecord::build(
            "k.csv",
            vec!["id".to_string()],
            1,
            5,
            fixed_instant(),
        );

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"filename":"k.csv","upload_timestamp":"2024-03-09 07:05:02","file_size_bytes":5,"row_count":1,"column_count":1,"column_names":["id"]}"#
        );
    }
}
