//! Name ↔ id lookups across reference collections.

use std::collections::HashMap;

use rusqlite::Connection;

use gbp_catalog::EntityKind;

use crate::error::SeedError;

/// Resolves relation names to live record ids, and back.
///
/// Reverse lookups are cached for the lifetime of the resolver, which is
/// one seed or dump run.
pub struct Resolver<'c> {
    conn: &'c Connection,
    names: HashMap<(EntityKind, String), String>,
}

impl<'c> Resolver<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            names: HashMap::new(),
        }
    }

    /// Id of the `kind` record named `name`.
    pub fn resolve(&self, kind: EntityKind, name: &str) -> Result<String, SeedError> {
        let sql = format!(
            "SELECT id FROM {} WHERE name = ?1 ORDER BY rowid LIMIT 2",
            kind.collection()
        );
        let mut stmt = self
            .conn
            .prepare_cached(&sql)
            .map_err(gbp_db::StoreError::from)?;
        let ids = stmt
            .query_map([name], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(gbp_db::StoreError::from)?;

        match ids.as_slice() {
            [] => Err(SeedError::NotFound {
                kind,
                name: name.to_string(),
            }),
            [id] => Ok(id.clone()),
            _ => Err(SeedError::AmbiguousName {
                kind,
                name: name.to_string(),
                count: ids.len(),
            }),
        }
    }

    /// Resolve every name, preserving order.
    pub fn resolve_many(
        &self,
        kind: EntityKind,
        names: &[String],
    ) -> Result<Vec<String>, SeedError> {
        names.iter().map(|name| self.resolve(kind, name)).collect()
    }

    /// `None` and the empty string both mean "no relation".
    pub fn resolve_optional(
        &self,
        kind: EntityKind,
        name: Option<&str>,
    ) -> Result<Option<String>, SeedError> {
        match name {
            Some(name) if !name.is_empty() => self.resolve(kind, name).map(Some),
            _ => Ok(None),
        }
    }

    /// Name of the `kind` record with `id`.
    pub fn name_of(&mut self, kind: EntityKind, id: &str) -> Result<String, SeedError> {
        let key = (kind, id.to_string());
        if let Some(name) = self.names.get(&key) {
            return Ok(name.clone());
        }

        let sql = format!("SELECT name FROM {} WHERE id = ?1", kind.collection());
        let name: String = match self.conn.query_row(&sql, [id], |row| row.get(0)) {
            Ok(name) => name,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                let err = gbp_db::StoreError::not_found(kind.collection(), "id", id);
                return Err(err.into());
            }
            Err(e) => return Err(gbp_db::StoreError::from(e).into()),
        };

        self.names.insert(key, name.clone());
        Ok(name)
    }

    pub fn names_of(&mut self, kind: EntityKind, ids: &[String]) -> Result<Vec<String>, SeedError> {
        ids.iter().map(|id| self.name_of(kind, id)).collect()
    }

    pub fn name_of_optional(
        &mut self,
        kind: EntityKind,
        id: Option<&str>,
    ) -> Result<Option<String>, SeedError> {
        match id {
            Some(id) if !id.is_empty() => self.name_of(kind, id).map(Some),
            _ => Ok(None),
        }
    }
}
