use std::io::{self, Write};

use crate::adapters::warehouse::{RowInsertError, TableRef, Warehouse, WarehouseError};
use crate::domain::models::ParkingRecord;

pub const SUCCESS_MESSAGE: &str = "New rows have been added.";
pub const FAILURE_MESSAGE: &str = "Error while inserting rows into the records table";

/// Result of one load attempt. Never escalated to the caller as an error.
#[derive(Debug)]
pub enum LoadOutcome {
    Inserted {
        table: TableRef,
        rows: usize,
    },
    PartiallyFailed {
        table: TableRef,
        errors: Vec<RowInsertError>,
    },
    Failed {
        table: TableRef,
        cause: WarehouseError,
    },
}

impl LoadOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }

    pub fn report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::Inserted { .. } => writeln!(out, "{SUCCESS_MESSAGE}"),
            Self::PartiallyFailed { errors, .. } => {
                let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
                writeln!(
                    out,
                    "Encountered errors while inserting rows: [{}]",
                    listed.join(", ")
                )
            }
            Self::Failed { cause, .. } => {
                writeln!(out, "{cause}")?;
                writeln!(out, "{FAILURE_MESSAGE}")
            }
        }
    }
}

/// Connects, resolves `destination` and appends `rows` in one batch.
///
/// Client construction runs inside the guarded region, so credential
/// problems end up as `LoadOutcome::Failed` like any other storage error.
pub fn load<W, F>(connect: F, destination: &TableRef, rows: &[ParkingRecord]) -> LoadOutcome
where
    W: Warehouse,
    F: FnOnce() -> Result<W, WarehouseError>,
{
    let attempt = connect().and_then(|warehouse| {
        let table = warehouse.get_table(destination)?;
        warehouse.insert_rows(&table, rows)
    });

    let table = destination.clone();
    match attempt {
        Ok(errors) if errors.is_empty() => {
            tracing::info!(table = %table, rows = rows.len(), "rows appended");
            LoadOutcome::Inserted {
                table,
                rows: rows.len(),
            }
        }
        Ok(errors) => {
            tracing::warn!(
                table = %table,
                rows = rows.len(),
                failed = errors.len(),
                "batch insert reported row errors"
            );
            LoadOutcome::PartiallyFailed { table, errors }
        }
        Err(cause) => {
            tracing::error!(table = %table, error = %cause, "load failed");
            LoadOutcome::Failed { table, cause }
        }
    }
}
