//! Write the live reference dictionary into a dump file.

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::Connection;

use gbp_catalog::{AppSetting, DbDump, EntityKind, icon_file_name};
use gbp_db::{
    AppSettings, DICTIONARY_VERSION, FileStorage, IconRecord, NewFile, Store, StoreTx,
    find_dump_by_hash, insert_dump, list_all,
};

use crate::dump_file::DumpFile;
use crate::error::SeedError;
use crate::hasher;
use crate::progress::SeedProgress;
use crate::resolver::Resolver;
use crate::rows::*;
use crate::seed::SeedPhase;

/// Reads live records back into dump rows.
pub struct Extractor<'a> {
    files: &'a FileStorage,
    resolver: Resolver<'a>,
    icons: u64,
}

impl<'a> Extractor<'a> {
    pub fn new(conn: &'a Connection, files: &'a FileStorage) -> Self {
        Self {
            files,
            resolver: Resolver::new(conn),
            icons: 0,
        }
    }

    pub fn resolver(&mut self) -> &mut Resolver<'a> {
        &mut self.resolver
    }

    /// The record's icon bytes, renamed after the record.
    pub fn icon<R: IconRecord>(&mut self, record: &R) -> Result<Option<IconBlob>, SeedError> {
        if record.icon().is_empty() {
            return Ok(None);
        }
        let content = self
            .files
            .read(R::COLLECTION, record.id(), record.icon())?;
        self.icons += 1;
        Ok(Some(IconBlob {
            filename: icon_file_name(record.name(), record.icon()),
            content,
        }))
    }
}

/// Statistics from a dump run.
#[derive(Debug, Default, Clone)]
pub struct DumpStats {
    pub rows: BTreeMap<EntityKind, u64>,
    pub icons: u64,
}

impl DumpStats {
    pub fn total_rows(&self) -> u64 {
        self.rows.values().sum()
    }
}

/// Write every reference record of the live store into the dump file at `path`.
///
/// Each kind's table is dropped and recreated. All writes to the file happen
/// in one transaction, and the store is read inside one transaction so the
/// snapshot is consistent.
pub fn dump(
    store: &Store,
    path: &Path,
    progress: &dyn SeedProgress,
) -> Result<DumpStats, SeedError> {
    log::info!("Dumping to {}", path.display());
    progress.on_phase(SeedPhase::ConnectingDumpDb);
    let file = DumpFile::create(path)?;

    let read_tx = store.transaction()?;
    let file_tx = file.transaction()?;
    progress.on_phase(SeedPhase::InTransaction);

    let mut ex = Extractor::new(read_tx.conn(), read_tx.files());
    let mut stats = DumpStats::default();

    for kind in EntityKind::ALL {
        progress.on_phase(SeedPhase::Dumping(kind));
        let count = match kind {
            EntityKind::Special => {
                dump_kind::<SpecialRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::Element => {
                dump_kind::<ElementRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::CharacterRole => {
                dump_kind::<CharacterRoleRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::ArtifactSet => {
                dump_kind::<ArtifactSetRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::ArtifactType => {
                dump_kind::<ArtifactTypeRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::DomainOfBlessing => {
                dump_kind::<DomainOfBlessingRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::WeaponType => {
                dump_kind::<WeaponTypeRow>(read_tx.conn(), &file, &mut ex, progress)
            }
            EntityKind::Weapon => dump_kind::<WeaponRow>(read_tx.conn(), &file, &mut ex, progress),
            EntityKind::Character => {
                dump_kind::<CharacterRow>(read_tx.conn(), &file, &mut ex, progress)
            }
        };
        match count {
            Ok(count) => {
                stats.rows.insert(kind, count);
            }
            Err(e) => {
                log::error!("Dump to {} failed: {}", path.display(), e);
                progress.on_phase(SeedPhase::RollingBack);
                progress.on_phase(SeedPhase::Failed);
                return Err(e);
            }
        }
    }
    stats.icons = ex.icons;

    progress.on_phase(SeedPhase::Committing);
    file_tx.commit().map_err(crate::error::DumpFileError::from)?;
    drop(read_tx);

    progress.on_phase(SeedPhase::Completed);
    progress.on_complete(&format!(
        "Dump complete: {} rows, {} icons",
        stats.total_rows(),
        stats.icons
    ));
    Ok(stats)
}

fn dump_kind<T: EntityRow>(
    conn: &Connection,
    file: &DumpFile,
    ex: &mut Extractor<'_>,
    progress: &dyn SeedProgress,
) -> Result<u64, SeedError> {
    file.recreate_table::<T>()?;
    let records: Vec<T::Record> = list_all(conn)?;
    for (i, record) in records.iter().enumerate() {
        let row = T::extract(record, ex)?;
        file.insert(&row)?;
        progress.on_row(T::kind(), i + 1, records.len(), row.name());
    }
    Ok(records.len() as u64)
}

/// Record the dump file at `path` in the dump history.
///
/// A file whose hash is already recorded returns the existing entry.
pub fn save_dump(store: &Store, path: &Path, notes: &str) -> Result<DbDump, SeedError> {
    let hash = hasher::hash_file(path)?;
    let file = NewFile::from_path(path)?;
    store.run_in_transaction(|tx| record_in(tx, &hash, &file, notes))
}

/// Record `file` in the dump history inside `tx`.
///
/// A file whose hash is already recorded returns the existing entry.
pub fn record_in(
    tx: &StoreTx<'_>,
    hash: &str,
    file: &NewFile,
    notes: &str,
) -> Result<DbDump, SeedError> {
    if let Some(existing) = find_dump_by_hash(tx.conn(), hash)? {
        log::info!("Dump {} already recorded as {}", hash, existing.id);
        return Ok(existing);
    }
    Ok(insert_dump(tx.conn(), tx.files(), hash, file, notes)?)
}

/// Dump the live store into `path` and record it in the dump history.
pub fn dump_and_save(
    store: &Store,
    path: &Path,
    notes: &str,
    progress: &dyn SeedProgress,
) -> Result<(DumpStats, DbDump), SeedError> {
    let stats = dump(store, path, progress)?;
    let saved = save_dump(store, path, notes)?;
    Ok((stats, saved))
}

/// Set `dictionaryVersion` to the hash of the file at `path`.
pub fn update_dictionary_version(store: &Store, path: &Path) -> Result<AppSetting, SeedError> {
    let hash = hasher::hash_file(path)?;
    let setting = AppSettings::new(store.conn()).upsert(DICTIONARY_VERSION, &hash)?;
    log::info!("Dictionary version is now {}", hash);
    Ok(setting)
}
