use rusqlite::{Connection, OptionalExtension, params};

use crate::adapters::warehouse::{
    RowInsertError, TableHandle, TableRef, Warehouse, WarehouseError,
};
use crate::domain::models::ParkingRecord;

pub const RECORDS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    station_id TEXT NOT NULL,
    state TEXT,
    available INTEGER,
    max INTEGER,
    display TEXT,
    last_update TEXT,
    record_timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_record_timestamp
ON records (record_timestamp DESC);
"#;

/// Creates the `records` table. Only used to prepare local databases; the
/// job itself never creates schema.
pub fn provision(connection: &Connection) -> Result<(), WarehouseError> {
    connection.execute_batch(RECORDS_TABLE_SQL)?;
    Ok(())
}

/// Local stand-in for the warehouse. Project and dataset are not meaningful
/// for SQLite, so tables resolve by name only.
pub struct SqliteWarehouse {
    connection: Connection,
}

impl SqliteWarehouse {
    pub fn open(path: &str) -> Result<Self, WarehouseError> {
        let connection = Connection::open(path)?;
        Ok(Self { connection })
    }

    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn count_rows(&self, table: &str) -> Result<i64, WarehouseError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.replace('"', "\"\""));
        let count = self.connection.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

impl Warehouse for SqliteWarehouse {
    fn get_table(&self, reference: &TableRef) -> Result<TableHandle, WarehouseError> {
        let exists = self
            .connection
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![reference.table],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        if exists.is_none() {
            return Err(WarehouseError::TableNotFound(reference.to_string()));
        }

        let mut statement = self
            .connection
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = statement
            .query_map(params![reference.table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableHandle {
            reference: reference.clone(),
            columns,
        })
    }

    fn insert_rows(
        &self,
        table: &TableHandle,
        rows: &[ParkingRecord],
    ) -> Result<Vec<RowInsertError>, WarehouseError> {
        let transaction = self.connection.unchecked_transaction()?;
        let sql = format!(
            "INSERT INTO \"{}\" (station_id, state, available, max, display, last_update, record_timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            table.reference.table.replace('"', "\"\"")
        );

        let mut errors = Vec::new();
        {
            let mut statement = transaction.prepare(&sql)?;
            for (index, row) in rows.iter().enumerate() {
                let result = statement.execute(params![
                    row.station_id,
                    row.state,
                    row.available,
                    row.max,
                    row.display,
                    row.last_update,
                    row.record_timestamp.to_rfc3339(),
                ]);

                if let Err(error) = result {
                    errors.push(RowInsertError {
                        index,
                        reason: "invalid".to_string(),
                        message: error.to_string(),
                    });
                }
            }
        }
        transaction.commit()?;

        Ok(errors)
    }
}
