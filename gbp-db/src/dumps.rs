//! Dump history (`_db_dumps`).

use std::path::PathBuf;

use rusqlite::Connection;

use gbp_catalog::DbDump;

use crate::error::StoreError;
use crate::files::{FileStorage, NewFile};
use crate::operations::{self, find_first_by_field};
use crate::records::Record;

const SELECT_LATEST: &str = "SELECT id, hash, dump, notes, created, updated FROM _db_dumps
     ORDER BY created DESC, rowid DESC LIMIT 1";

/// The most recently created dump.
pub fn latest_dump(conn: &Connection) -> Result<Option<DbDump>, StoreError> {
    match conn.query_row(SELECT_LATEST, [], DbDump::from_row) {
        Ok(dump) => Ok(Some(dump)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_dump_by_hash(conn: &Connection, hash: &str) -> Result<Option<DbDump>, StoreError> {
    find_first_by_field(conn, "hash", &hash)
}

/// All dumps, oldest first.
pub fn list_dumps(conn: &Connection) -> Result<Vec<DbDump>, StoreError> {
    operations::list_all(conn)
}

/// Record a new dump and store its file.
///
/// A dump whose hash is already recorded is rejected as `Duplicate`.
pub fn insert_dump(
    conn: &Connection,
    files: &FileStorage,
    hash: &str,
    file: &NewFile,
    notes: &str,
) -> Result<DbDump, StoreError> {
    if find_dump_by_hash(conn, hash)?.is_some() {
        return Err(StoreError::Duplicate {
            collection: DbDump::COLLECTION.to_string(),
            detail: format!("a dump with hash {} already exists", hash),
        });
    }

    let mut dump = DbDump {
        id: crate::ids::new_id(),
        hash: hash.to_string(),
        notes: notes.to_string(),
        ..Default::default()
    };
    dump.dump = files.attach(DbDump::COLLECTION, &dump.id, "", file)?;
    operations::save(conn, &mut dump)?;
    log::info!("Saved dump {} ({})", dump.id, dump.hash);
    Ok(dump)
}

/// Location of a dump's file on disk.
pub fn dump_file_path(files: &FileStorage, dump: &DbDump) -> PathBuf {
    files.path_of(DbDump::COLLECTION, &dump.id, &dump.dump)
}
