use std::fmt;

use thiserror::Error;

use crate::domain::models::ParkingRecord;

pub const TABLE_NAME: &str = "records";

/// Fully-qualified `<project>.<dataset>.<table>` destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableRef {
    pub fn records(project: &str, dataset: &str) -> Self {
        Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
            table: TABLE_NAME.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// A destination table that has been confirmed to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub reference: TableRef,
    pub columns: Vec<String>,
}

/// A row the warehouse refused while accepting the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInsertError {
    pub index: usize,
    pub reason: String,
    pub message: String,
}

impl fmt::Display for RowInsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}: {}", self.index, self.reason, self.message)
    }
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("failed to read credentials from {path}: {reason}")]
    Credentials { path: String, reason: String },
    #[error("failed to obtain access token: {0}")]
    Auth(String),
    #[error("warehouse request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Not found: Table {0}")]
    TableNotFound(String),
    #[error("warehouse API answered with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to serialize row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("local warehouse operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub trait Warehouse {
    fn get_table(&self, reference: &TableRef) -> Result<TableHandle, WarehouseError>;

    /// Appends rows in one batch. Rows refused individually are reported in
    /// the returned list; an `Err` means the batch as a whole failed.
    fn insert_rows(
        &self,
        table: &TableHandle,
        rows: &[ParkingRecord],
    ) -> Result<Vec<RowInsertError>, WarehouseError>;
}

#[cfg(test)]
mod tests {
    use super::{RowInsertError, TableRef};

    #[test]
    fn formats_fully_qualified_records_table() {
        let reference = TableRef::records("parkings-mel", "parkings_mel");

        assert_eq!(reference.to_string(), "parkings-mel.parkings_mel.records");
    }

    #[test]
    fn formats_row_error_with_index_and_reason() {
        let error = RowInsertError {
            index: 3,
            reason: "invalid".to_string(),
            message: "no such field: foo".to_string(),
        };

        assert_eq!(error.to_string(), "row 3: invalid: no such field: foo");
    }
}
