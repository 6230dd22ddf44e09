//! Snapshot lifecycle: the operations the CLI and HTTP layer drive.

use std::path::PathBuf;

use gbp_catalog::DbDump;
use gbp_db::{
    AppSettings, NewFile, Store, dump_file_path, find_by_id, find_dump_by_hash, latest_dump,
};

use crate::dump::{DumpStats, dump_and_save, record_in, update_dictionary_version};
use crate::error::SeedError;
use crate::hasher;
use crate::progress::SeedProgress;
use crate::seed::{SeedStats, seed, seed_then};

/// The bundled seed: the dump file plus its optional precomputed hash and
/// release note.
#[derive(Debug, Clone)]
pub struct SeedSource {
    pub file: PathBuf,
    pub hash_file: PathBuf,
    pub note_file: PathBuf,
}

impl SeedSource {
    /// Hash from the hash file when present, otherwise computed from the dump.
    pub fn hash(&self) -> Result<String, SeedError> {
        if self.hash_file.is_file() {
            let hash = hasher::read_hash(&self.hash_file)?;
            if !hash.is_empty() {
                return Ok(hash);
            }
        }
        hasher::hash_file(&self.file)
    }

    pub fn notes(&self) -> Result<String, SeedError> {
        if !self.note_file.is_file() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&self.note_file)
            .map(|s| s.trim().to_string())
            .map_err(|e| SeedError::io(&self.note_file, e))
    }
}

#[derive(Debug, Clone)]
pub enum SeedOutcome {
    Seeded(SeedStats),
    /// The dump was already applied; nothing was written.
    Unchanged { hash: String },
}

impl SeedOutcome {
    pub fn is_seeded(&self) -> bool {
        matches!(self, SeedOutcome::Seeded(_))
    }
}

/// Seed from `source` unless its hash is already the dictionary version or
/// the hash of the latest recorded dump.
pub fn update_seed_if_changed(
    store: &Store,
    source: &SeedSource,
    progress: &dyn SeedProgress,
) -> Result<SeedOutcome, SeedError> {
    let hash = source.hash()?;

    let version = AppSettings::new(store.conn()).dictionary_version()?;
    if version.as_deref() == Some(hash.as_str()) {
        log::info!("Seed {} already applied", hash);
        return Ok(SeedOutcome::Unchanged { hash });
    }
    if let Some(latest) = latest_dump(store.conn())? {
        if latest.hash == hash {
            log::info!("Seed {} matches latest dump {}", hash, latest.id);
            return Ok(SeedOutcome::Unchanged { hash });
        }
    }

    log::info!("Seed changed, applying {}", source.file.display());
    let notes = source.notes()?;
    let file = NewFile::from_path(&source.file)?;
    let (stats, saved) = seed_then(store, &source.file, progress, |tx, stats| {
        record_in(tx, &stats.hash, &file, &notes)
    })?;
    log::debug!("Seed recorded as dump {}", saved.id);
    Ok(SeedOutcome::Seeded(stats))
}

/// Dump the live store into a new dump, record it, and mark it as the
/// dictionary version.
pub fn generate(
    store: &Store,
    notes: &str,
    progress: &dyn SeedProgress,
) -> Result<(DumpStats, DbDump), SeedError> {
    let tmp = tempfile::Builder::new()
        .prefix("dump_")
        .suffix(".db")
        .tempfile_in(store.data_dir())
        .map_err(|e| SeedError::io(store.data_dir(), e))?;

    let (stats, saved) = dump_and_save(store, tmp.path(), notes, progress)?;
    update_dictionary_version(store, tmp.path())?;
    Ok((stats, saved))
}

/// Seed from an uploaded dump and record it.
///
/// A new dump is seeded from a staged copy and recorded in the same
/// transaction, so a dump that fails to seed leaves no history entry. A
/// dump whose hash is already recorded is not stored again, and seeding is
/// skipped when it is already the dictionary version.
pub fn upload(
    store: &Store,
    file: NewFile,
    notes: &str,
    progress: &dyn SeedProgress,
) -> Result<(DbDump, SeedOutcome), SeedError> {
    let hash = hasher::hash_bytes(&file.content);
    let version = AppSettings::new(store.conn()).dictionary_version()?;
    let applied = version.as_deref() == Some(hash.as_str());

    if let Some(existing) = find_dump_by_hash(store.conn(), &hash)? {
        log::info!("Uploaded dump matches {}", existing.id);
        if applied {
            return Ok((existing, SeedOutcome::Unchanged { hash }));
        }
        let stats = seed(store, &dump_file_path(store.files(), &existing), progress)?;
        return Ok((existing, SeedOutcome::Seeded(stats)));
    }

    if applied {
        let saved = store.run_in_transaction(|tx| record_in(tx, &hash, &file, notes))?;
        return Ok((saved, SeedOutcome::Unchanged { hash }));
    }

    let staged = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(".db")
        .tempfile_in(store.data_dir())
        .map_err(|e| SeedError::io(store.data_dir(), e))?;
    std::fs::write(staged.path(), &file.content).map_err(|e| SeedError::io(staged.path(), e))?;

    let (stats, saved) = seed_then(store, staged.path(), progress, |tx, _| {
        record_in(tx, &hash, &file, notes)
    })?;
    Ok((saved, SeedOutcome::Seeded(stats)))
}

/// Re-seed from a recorded dump.
pub fn restore(
    store: &Store,
    dump_id: &str,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    let dump: DbDump = find_by_id(store.conn(), dump_id)?
        .ok_or_else(|| SeedError::DumpNotFound(dump_id.to_string()))?;
    log::info!("Restoring dump {} ({})", dump.id, dump.hash);
    seed(store, &dump_file_path(store.files(), &dump), progress)
}

/// The latest recorded dump and the location of its file.
pub fn latest(store: &Store) -> Result<Option<(DbDump, PathBuf)>, SeedError> {
    Ok(latest_dump(store.conn())?.map(|dump| {
        let path = dump_file_path(store.files(), &dump);
        (dump, path)
    }))
}

