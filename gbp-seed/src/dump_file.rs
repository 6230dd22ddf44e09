//! The portable dump file: a standalone SQLite database.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row, Transaction, params_from_iter};

use crate::error::DumpFileError;
use crate::rows::EntityRow;

/// An open dump file. The connection closes when this is dropped.
pub struct DumpFile {
    conn: Connection,
    path: PathBuf,
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A value in column `idx` of `row` that does not decode.
fn malformed<T: EntityRow>(row: &Row<'_>, (idx, message): (usize, String)) -> DumpFileError {
    DumpFileError::Malformed {
        table: T::kind().dump_table(),
        column: T::COLUMNS.get(idx).copied().unwrap_or("?"),
        name: row.get::<_, String>("name").unwrap_or_default(),
        message,
    }
}

impl DumpFile {
    /// Open an existing dump file for reading.
    pub fn open(path: &Path) -> Result<Self, DumpFileError> {
        if !path.is_file() {
            return Err(DumpFileError::NotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::debug!("Opened dump file {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open a dump file for writing, creating it if needed.
    pub fn create(path: &Path) -> Result<Self, DumpFileError> {
        let conn = Connection::open(path)?;
        log::debug!("Writing dump file {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_table(&self, table: &str) -> Result<bool, DumpFileError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            [table],
            |row| row.get(0),
        )?)
    }

    /// All rows of the kind's table, in file order.
    pub fn read_rows<T: EntityRow>(&self) -> Result<Vec<T>, DumpFileError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            column_list(T::COLUMNS),
            T::kind().dump_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let message = match T::from_sql(row) {
                Ok(value) => {
                    out.push(value);
                    continue;
                }
                Err(rusqlite::Error::FromSqlConversionFailure(idx, _, source)) => {
                    (idx, source.to_string())
                }
                Err(rusqlite::Error::InvalidColumnType(idx, _, ty)) => {
                    (idx, format!("unexpected {} value", ty))
                }
                Err(e) => return Err(e.into()),
            };
            return Err(malformed::<T>(row, message));
        }
        Ok(out)
    }

    /// Drop the kind's table if present and create it empty.
    pub fn recreate_table<T: EntityRow>(&self) -> Result<(), DumpFileError> {
        let table = T::kind().dump_table();
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({});",
            T::TABLE_SQL
        ))?;
        Ok(())
    }

    pub fn insert<T: EntityRow>(&self, row: &T) -> Result<(), DumpFileError> {
        let placeholders: Vec<String> = (1..=T::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::kind().dump_table(),
            column_list(T::COLUMNS),
            placeholders.join(", ")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(row.sql_values()))?;
        Ok(())
    }

    /// Start a transaction; statements issued through this file join it.
    pub fn transaction(&self) -> Result<Transaction<'_>, DumpFileError> {
        Ok(self.conn.unchecked_transaction()?)
    }
}
