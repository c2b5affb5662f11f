//! Synthetic benchmark record and its two serializations.

use bigquery_client::{FieldSchema, InsertId, Row, TableSchema, ValueSaver};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::LazyLock;

/// Format of `created_at` in the row sent to BigQuery (a DATETIME column).
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Schema of the destination table.
pub static TABLE_SCHEMA: LazyLock<TableSchema> = LazyLock::new(|| {
    TableSchema::new(vec![
        FieldSchema::string("name"),
        FieldSchema::integer("id"),
        FieldSchema::date_time("created_at"),
    ])
});

/// One synthetic row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    name: &'static str,
    id: i64,
    created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(name: &'static str, id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            id,
            created_at,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Generic JSON form, with `created_at` kept as an RFC 3339 timestamp.
    ///
    /// Used for diagnostics, e.g. when a write fails.
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "id": self.id,
            "created_at": self.created_at,
        })
    }
}

impl ValueSaver for Record {
    fn save(&self) -> (Row, InsertId) {
        let mut row = Row::new();
        row.insert("name".to_string(), Value::from(self.name));
        row.insert("id".to_string(), Value::from(self.id));
        row.insert(
            "created_at".to_string(),
            Value::from(self.created_at.format(CREATED_AT_FORMAT).to_string()),
        );
        (row, InsertId::NoDedupe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigquery_client::FieldType;
    use chrono::NaiveDate;

    fn sample() -> Record {
        let created_at = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_milli_opt(5, 6, 7, 891)
            .unwrap()
            .and_utc();
        Record::new("Louis Green", 84, created_at)
    }

    #[test]
    fn test_save_row() {
        let (row, insert_id) = sample().save();

        assert_eq!(insert_id, InsertId::NoDedupe);
        assert_eq!(row.len(), 3);
        assert_eq!(row["name"], json!("Louis Green"));
        assert_eq!(row["id"], json!(84));
        // No zone suffix and no fractional seconds.
        assert_eq!(row["created_at"], json!("2021-03-04 05:06:07"));
    }

    #[test]
    fn test_save_row_keys_match_schema() {
        let (row, _) = sample().save();
        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut columns = TABLE_SCHEMA.field_names();
        columns.sort_unstable();
        assert_eq!(keys, columns);
    }

    #[test]
    fn test_to_json_keeps_structured_timestamp() {
        let value = sample().to_json();
        assert_eq!(
            value,
            json!({
                "name": "Louis Green",
                "id": 84,
                "created_at": "2021-03-04T05:06:07.891Z",
            })
        );
    }

    #[test]
    fn test_table_schema() {
        let fields: Vec<(&str, FieldType)> = TABLE_SCHEMA
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.field_type))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("name", FieldType::String),
                ("id", FieldType::Integer),
                ("created_at", FieldType::Datetime),
            ]
        );
    }
}
