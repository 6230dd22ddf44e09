//! The live store: one SQLite connection plus its file storage.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, Transaction};

use crate::error::StoreError;
use crate::files::FileStorage;
use crate::schema;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "data.db";
/// Directory holding attachments inside the data directory.
pub const STORAGE_DIR: &str = "storage";

pub struct Store {
    conn: Connection,
    files: FileStorage,
    data_dir: PathBuf,
}

impl Store {
    /// Open (or create) the store in `data_dir` and apply pending migrations.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::File {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let conn = schema::open_database(&data_dir.join(DATABASE_FILE))?;
        let files = FileStorage::new(data_dir.join(STORAGE_DIR))?;
        log::debug!("Opened store at {}", data_dir.display());
        Ok(Self {
            conn,
            files,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// In-memory database with file storage under `data_dir`. Useful for testing.
    pub fn open_in_memory(data_dir: &Path) -> Result<Self, StoreError> {
        let conn = schema::open_memory()?;
        let files = FileStorage::new(data_dir.join(STORAGE_DIR))?;
        Ok(Self {
            conn,
            files,
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn files(&self) -> &FileStorage {
        &self.files
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn schema_version(&self) -> Result<i32, StoreError> {
        Ok(schema::schema_version(&self.conn)?)
    }

    /// Begin a transaction covering both the database and file storage.
    pub fn transaction(&self) -> Result<StoreTx<'_>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        Ok(StoreTx {
            tx: Some(tx),
            files: &self.files,
        })
    }

    /// Run `f` in a transaction, committing on `Ok` and rolling back on `Err`.
    pub fn run_in_transaction<T, E>(
        &self,
        f: impl FnOnce(&StoreTx<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let tx = self.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

/// An open store transaction.
///
/// Dropping it without [`StoreTx::commit`] rolls back the database and
/// removes files written through it.
pub struct StoreTx<'s> {
    tx: Option<Transaction<'s>>,
    files: &'s FileStorage,
}

impl<'s> StoreTx<'s> {
    pub fn conn(&self) -> &Connection {
        // Only `commit` and `drop` take the transaction out.
        match &self.tx {
            Some(tx) => &**tx,
            None => unreachable!("transaction used after commit"),
        }
    }

    pub fn files(&self) -> &FileStorage {
        self.files
    }

    pub fn commit(mut self) -> Result<(), StoreError> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        match tx.commit() {
            Ok(()) => {
                self.files.commit();
                Ok(())
            }
            Err(e) => {
                self.files.rollback();
                Err(e.into())
            }
        }
    }
}

impl Drop for StoreTx<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback() {
                log::error!("Rollback failed: {}", e);
            }
            if self.files.pending() > 0 {
                log::debug!("Discarding {} staged file(s)", self.files.pending());
            }
            self.files.rollback();
        }
    }
}
