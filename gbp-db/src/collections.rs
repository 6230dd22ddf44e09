//! Lookups in the collection registry (`_collections`).

use rusqlite::{Connection, Row};

use gbp_catalog::{CollectionInfo, CollectionType, PlanCollection, collections};

use crate::error::StoreError;

const SELECT_COLLECTION: &str = "SELECT id, name, type, list_rule, view_rule FROM _collections";

fn collection_from_row(row: &Row<'_>) -> rusqlite::Result<CollectionInfo> {
    let collection_type: String = row.get("type")?;
    Ok(CollectionInfo {
        id: row.get("id")?,
        name: row.get("name")?,
        collection_type: CollectionType::from_str_loose(&collection_type),
        list_rule: row.get("list_rule")?,
        view_rule: row.get("view_rule")?,
    })
}

/// Find a collection by name or id.
pub fn find_collection(
    conn: &Connection,
    name_or_id: &str,
) -> Result<Option<CollectionInfo>, StoreError> {
    let sql = format!("{} WHERE name = ?1 OR id = ?1 LIMIT 1", SELECT_COLLECTION);
    match conn.query_row(&sql, [name_or_id], collection_from_row) {
        Ok(info) => Ok(Some(info)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_collections(conn: &Connection) -> Result<Vec<CollectionInfo>, StoreError> {
    let sql = format!("{} ORDER BY rowid", SELECT_COLLECTION);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], collection_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// The plan collections that exist, in their canonical order.
pub fn plan_collections(conn: &Connection) -> Result<Vec<PlanCollection>, StoreError> {
    let mut plans = Vec::with_capacity(collections::PLANS.len());
    for name in collections::PLANS {
        match find_collection(conn, name)? {
            Some(info) => plans.push(PlanCollection {
                id: info.id,
                name: info.name,
            }),
            None => log::warn!("Plan collection {} is not registered", name),
        }
    }
    Ok(plans)
}
