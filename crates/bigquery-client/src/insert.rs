//! Streaming insert (`tabledata.insertAll`) request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row as a column name to JSON value mapping.
pub type Row = Map<String, Value>;

/// Per-row de-duplication token sent as `insertId`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertId {
    /// No de-duplication requested; `insertId` is omitted.
    #[default]
    NoDedupe,
    /// Best-effort de-duplication on this token.
    Token(String),
}

impl InsertId {
    fn into_option(self) -> Option<String> {
        match self {
            InsertId::NoDedupe => None,
            InsertId::Token(token) => Some(token),
        }
    }
}

/// Types that can be written as a streaming insert row.
pub trait ValueSaver {
    /// Convert into a row and its de-duplication token.
    fn save(&self) -> (Row, InsertId);
}

/// One entry of the `rows` array of an insertAll request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,
    pub json: Row,
}

impl InsertAllRow {
    pub fn from_saver<T: ValueSaver + ?Sized>(value: &T) -> Self {
        let (json, insert_id) = value.save();
        Self {
            insert_id: insert_id.into_option(),
            json,
        }
    }
}

/// Body of a `tabledata.insertAll` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRequest {
    /// Insert the valid rows of a request even if some rows are invalid.
    pub skip_invalid_rows: bool,
    /// Accept values that do not match the table schema and drop them.
    pub ignore_unknown_values: bool,
    pub rows: Vec<InsertAllRow>,
}

impl InsertAllRequest {
    pub fn new(rows: Vec<InsertAllRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Error detail attached to a rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for ErrorProto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = self.reason.as_deref().unwrap_or("unknown");
        match (&self.location, &self.message) {
            (Some(location), Some(message)) => write!(f, "{reason} at '{location}': {message}"),
            (None, Some(message)) => write!(f, "{reason}: {message}"),
            _ => write!(f, "{reason}"),
        }
    }
}

/// Errors reported for one row of the request, by position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RowInsertErrors {
    pub index: u32,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

/// Response of a `tabledata.insertAll` call.
///
/// A 200 response can still carry row-level failures in `insert_errors`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllResponse {
    #[serde(default)]
    pub insert_errors: Vec<RowInsertErrors>,
}

impl InsertAllResponse {
    pub fn has_errors(&self) -> bool {
        !self.insert_errors.is_empty()
    }
}
