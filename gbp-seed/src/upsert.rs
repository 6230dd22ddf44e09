//! Find-or-create of live records by name, plus icon attachment.

use rusqlite::Connection;

use gbp_catalog::icon_file_name;
use gbp_db::{FileStorage, IconRecord, NamedRecord, NewFile, find_all_by_field, ids};

use crate::error::SeedError;
use crate::resolver::Resolver;
use crate::rows::IconBlob;

/// Applies dump rows to the live store within one transaction.
pub struct Upserter<'a> {
    conn: &'a Connection,
    files: &'a FileStorage,
    resolver: Resolver<'a>,
}

impl<'a> Upserter<'a> {
    pub fn new(conn: &'a Connection, files: &'a FileStorage) -> Self {
        Self {
            conn,
            files,
            resolver: Resolver::new(conn),
        }
    }

    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    /// The live record named `name`, or a fresh unsaved one.
    ///
    /// A fresh record already carries its new id so files can be attached
    /// before it is saved. Returns `true` alongside a fresh record.
    pub fn upsert<R: NamedRecord>(&self, name: &str) -> Result<(R, bool), SeedError> {
        let mut matches: Vec<R> = find_all_by_field(self.conn, "name", &name)?;
        match matches.len() {
            0 => {
                let mut record = R::named(name);
                record.set_id(ids::new_id());
                Ok((record, true))
            }
            1 => Ok((matches.remove(0), false)),
            count => Err(SeedError::AmbiguousName {
                kind: R::KIND,
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Store `icon` as the record's icon file.
    ///
    /// Without an icon the current one is left in place; an icon whose bytes
    /// match the stored file is not written again.
    pub fn attach_icon<R: IconRecord>(
        &self,
        record: &mut R,
        icon: Option<&IconBlob>,
    ) -> Result<(), SeedError> {
        let Some(icon) = icon else {
            return Ok(());
        };

        if !record.icon().is_empty() {
            match self.files.read(R::COLLECTION, record.id(), record.icon()) {
                Ok(current) if current == icon.content => return Ok(()),
                Ok(_) => {}
                Err(e) => log::warn!("Replacing unreadable icon of {}: {}", record.name(), e),
            }
        }

        let filename = if icon.filename.is_empty() {
            icon_file_name(record.name(), "")
        } else {
            icon.filename.clone()
        };
        let file = NewFile::from_bytes(icon.content.clone(), filename);
        let stored = self
            .files
            .attach(R::COLLECTION, record.id(), record.icon(), &file)?;
        record.set_icon(stored);
        Ok(())
    }
}
