//! Generic CRUD over [`Record`] types.
//!
//! Table and column names only ever come from `Record` constants; field
//! names supplied by callers are checked against [`Record::COLUMNS`] before
//! they reach SQL.

use rusqlite::types::Value;
use rusqlite::{Connection, ToSql, params_from_iter};

use crate::error::StoreError;
use crate::ids;
use crate::records::Record;

fn select_sql<R: Record>() -> String {
    let columns: Vec<String> = R::COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect();
    format!(
        "SELECT id, {}, created, updated FROM {}",
        columns.join(", "),
        R::COLLECTION
    )
}

fn check_field<R: Record>(field: &str) -> Result<(), StoreError> {
    if field == "id" || R::COLUMNS.contains(&field) {
        Ok(())
    } else {
        Err(StoreError::UnknownField {
            collection: R::COLLECTION.to_string(),
            field: field.to_string(),
        })
    }
}

fn check_collection_name(collection: &str) -> Result<(), StoreError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::UnknownCollection(collection.to_string()))
    }
}

/// Translate constraint failures into store errors.
fn map_write_error(collection: &str, err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref e, ref msg) = err {
        let detail = msg.clone().unwrap_or_else(|| e.to_string());
        match e.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return StoreError::Duplicate {
                    collection: collection.to_string(),
                    detail,
                };
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return StoreError::validation(collection, "relation", detail);
            }
            _ => {}
        }
    }
    err.into()
}

// ── Reads ───────────────────────────────────────────────────────────────────

/// Find a record by id.
pub fn find_by_id<R: Record>(conn: &Connection, id: &str) -> Result<Option<R>, StoreError> {
    let sql = format!("{} WHERE id = ?1", select_sql::<R>());
    match conn.query_row(&sql, [id], R::from_row) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Like [`find_by_id`], but a missing record is an error.
pub fn get_by_id<R: Record>(conn: &Connection, id: &str) -> Result<R, StoreError> {
    find_by_id(conn, id)?.ok_or_else(|| StoreError::not_found(R::COLLECTION, "id", id))
}

/// First record (in insertion order) whose `field` equals `value`.
pub fn find_first_by_field<R: Record>(
    conn: &Connection,
    field: &str,
    value: &dyn ToSql,
) -> Result<Option<R>, StoreError> {
    check_field::<R>(field)?;
    let sql = format!(
        "{} WHERE \"{}\" = ?1 ORDER BY rowid LIMIT 1",
        select_sql::<R>(),
        field
    );
    match conn.query_row(&sql, [value], R::from_row) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All records whose `field` equals `value`, in insertion order.
pub fn find_all_by_field<R: Record>(
    conn: &Connection,
    field: &str,
    value: &dyn ToSql,
) -> Result<Vec<R>, StoreError> {
    check_field::<R>(field)?;
    let sql = format!(
        "{} WHERE \"{}\" = ?1 ORDER BY rowid",
        select_sql::<R>(),
        field
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([value], R::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Every record of the collection, in insertion order.
pub fn list_all<R: Record>(conn: &Connection) -> Result<Vec<R>, StoreError> {
    let sql = format!("{} ORDER BY rowid", select_sql::<R>());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], R::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn count<R: Record>(conn: &Connection) -> Result<i64, StoreError> {
    let sql = format!("SELECT COUNT(*) FROM {}", R::COLLECTION);
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Whether a record with `id` exists in `collection`.
pub fn exists(conn: &Connection, collection: &str, id: &str) -> Result<bool, StoreError> {
    check_collection_name(collection)?;
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", collection);
    Ok(conn.query_row(&sql, [id], |row| row.get(0))?)
}

// ── Writes ──────────────────────────────────────────────────────────────────

/// Validate and persist a record.
///
/// A record with an empty id gets a fresh one and is inserted; otherwise the
/// row with that id is inserted or updated in place. `created` is set on
/// insert only, `updated` on every save.
pub fn save<R: Record>(conn: &Connection, record: &mut R) -> Result<(), StoreError> {
    record.validate(conn)?;
    if record.id().is_empty() {
        record.set_id(ids::new_id());
    }

    let values = record.values();
    debug_assert_eq!(values.len(), R::COLUMNS.len());

    let columns: Vec<String> = R::COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect();
    let placeholders: Vec<String> = (0..R::COLUMNS.len())
        .map(|i| format!("?{}", i + 2))
        .collect();
    let timestamp = R::COLUMNS.len() + 2;
    let updates: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    let sql = format!(
        "INSERT INTO {table} (id, {columns}, created, updated)
         VALUES (?1, {placeholders}, ?{timestamp}, ?{timestamp})
         ON CONFLICT(id) DO UPDATE SET {updates}, updated = excluded.updated",
        table = R::COLLECTION,
        columns = columns.join(", "),
        placeholders = placeholders.join(", "),
        timestamp = timestamp,
        updates = updates.join(", "),
    );

    let mut params = Vec::with_capacity(values.len() + 2);
    params.push(Value::Text(record.id().to_string()));
    params.extend(values);
    params.push(Value::Text(ids::now()));

    conn.execute(&sql, params_from_iter(params.iter()))
        .map_err(|e| map_write_error(R::COLLECTION, e))?;

    let (created, updated): (String, String) = conn.query_row(
        &format!(
            "SELECT created, updated FROM {} WHERE id = ?1",
            R::COLLECTION
        ),
        [record.id()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    record.set_timestamps(created, updated);
    Ok(())
}

/// Delete a record by id.
pub fn delete<R: Record>(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", R::COLLECTION);
    let affected = conn
        .execute(&sql, [id])
        .map_err(|e| map_write_error(R::COLLECTION, e))?;
    if affected == 0 {
        return Err(StoreError::not_found(R::COLLECTION, "id", id));
    }
    Ok(())
}
