//! Apply a dump file to the live store.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use gbp_catalog::EntityKind;
use gbp_db::{AppSettings, DICTIONARY_VERSION, Record, Store, StoreTx, save};

use crate::dump_file::DumpFile;
use crate::error::SeedError;
use crate::hasher;
use crate::progress::SeedProgress;
use crate::rows::*;
use crate::upsert::Upserter;

/// Where a seed or dump run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedPhase {
    Idle,
    ConnectingDumpDb,
    InTransaction,
    Seeding(EntityKind),
    /// Dump direction: writing one kind's table.
    Dumping(EntityKind),
    UpdatingVersionMarker,
    Committing,
    Completed,
    RollingBack,
    Failed,
}

impl fmt::Display for SeedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedPhase::Idle => f.write_str("Idle"),
            SeedPhase::ConnectingDumpDb => f.write_str("Opening dump file"),
            SeedPhase::InTransaction => f.write_str("Transaction started"),
            SeedPhase::Seeding(kind) => write!(f, "Seeding {}", kind.collection()),
            SeedPhase::Dumping(kind) => write!(f, "Dumping {}", kind.collection()),
            SeedPhase::UpdatingVersionMarker => f.write_str("Updating dictionary version"),
            SeedPhase::Committing => f.write_str("Committing"),
            SeedPhase::Completed => f.write_str("Completed"),
            SeedPhase::RollingBack => f.write_str("Rolling back"),
            SeedPhase::Failed => f.write_str("Failed"),
        }
    }
}

/// Per-kind outcome of a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindStats {
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
}

impl KindStats {
    pub fn total(&self) -> u64 {
        self.created + self.updated + self.unchanged
    }
}

/// Statistics from a seed run.
#[derive(Debug, Default, Clone)]
pub struct SeedStats {
    /// Hash of the applied dump file, now the dictionary version.
    pub hash: String,
    pub kinds: BTreeMap<EntityKind, KindStats>,
}

impl SeedStats {
    pub fn kind(&self, kind: EntityKind) -> KindStats {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn created(&self) -> u64 {
        self.kinds.values().map(|k| k.created).sum()
    }

    pub fn updated(&self) -> u64 {
        self.kinds.values().map(|k| k.updated).sum()
    }

    pub fn unchanged(&self) -> u64 {
        self.kinds.values().map(|k| k.unchanged).sum()
    }
}

/// Seed the live store from the dump file at `path`.
///
/// Every kind is applied in dependency order inside one store transaction,
/// then the `dictionaryVersion` setting is set to the file's hash. Any
/// failure rolls the whole run back, including files written by it.
pub fn seed(
    store: &Store,
    path: &Path,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    seed_then(store, path, progress, |_, _| Ok(())).map(|(stats, ())| stats)
}

/// Seed like [`seed`], then run `finish` in the same transaction.
///
/// `finish` sees the seeded state; its writes commit with the seed or not
/// at all.
pub fn seed_then<T>(
    store: &Store,
    path: &Path,
    progress: &dyn SeedProgress,
    finish: impl FnOnce(&StoreTx<'_>, &SeedStats) -> Result<T, SeedError>,
) -> Result<(SeedStats, T), SeedError> {
    log::info!("Seeding from {}", path.display());
    progress.on_phase(SeedPhase::ConnectingDumpDb);
    let dump = match DumpFile::open(path) {
        Ok(dump) => dump,
        Err(e) => {
            progress.on_phase(SeedPhase::Failed);
            return Err(e.into());
        }
    };

    match seed_in_transaction(store, &dump, progress, finish) {
        Ok((stats, value)) => {
            progress.on_phase(SeedPhase::Completed);
            progress.on_complete(&format!(
                "Seed complete: {} created, {} updated, {} unchanged",
                stats.created(),
                stats.updated(),
                stats.unchanged()
            ));
            Ok((stats, value))
        }
        Err(e) => {
            log::error!("Seed from {} failed: {}", path.display(), e);
            progress.on_phase(SeedPhase::Failed);
            Err(e)
        }
    }
}

fn seed_in_transaction<T>(
    store: &Store,
    dump: &DumpFile,
    progress: &dyn SeedProgress,
    finish: impl FnOnce(&StoreTx<'_>, &SeedStats) -> Result<T, SeedError>,
) -> Result<(SeedStats, T), SeedError> {
    let hash = hasher::hash_file(dump.path())?;
    let mut stats = SeedStats {
        hash,
        ..Default::default()
    };

    let tx = store.transaction()?;
    progress.on_phase(SeedPhase::InTransaction);

    let result = match apply_kinds(&tx, dump, progress, &mut stats) {
        Ok(()) => finish(&tx, &stats),
        Err(e) => Err(e),
    };
    let value = match result {
        Ok(value) => value,
        Err(e) => {
            progress.on_phase(SeedPhase::RollingBack);
            drop(tx);
            return Err(e);
        }
    };

    progress.on_phase(SeedPhase::Committing);
    tx.commit()?;
    Ok((stats, value))
}

/// Apply every kind in dependency order and set the version marker.
fn apply_kinds(
    tx: &StoreTx<'_>,
    dump: &DumpFile,
    progress: &dyn SeedProgress,
    stats: &mut SeedStats,
) -> Result<(), SeedError> {
    let up = Upserter::new(tx.conn(), tx.files());
    for kind in EntityKind::ALL {
        progress.on_phase(SeedPhase::Seeding(kind));
        let kind_stats = match kind {
            EntityKind::Special => seed_kind::<SpecialRow>(&up, dump, progress)?,
            EntityKind::Element => seed_kind::<ElementRow>(&up, dump, progress)?,
            EntityKind::CharacterRole => seed_kind::<CharacterRoleRow>(&up, dump, progress)?,
            EntityKind::ArtifactSet => seed_kind::<ArtifactSetRow>(&up, dump, progress)?,
            EntityKind::ArtifactType => seed_kind::<ArtifactTypeRow>(&up, dump, progress)?,
            EntityKind::DomainOfBlessing => seed_kind::<DomainOfBlessingRow>(&up, dump, progress)?,
            EntityKind::WeaponType => seed_kind::<WeaponTypeRow>(&up, dump, progress)?,
            EntityKind::Weapon => seed_kind::<WeaponRow>(&up, dump, progress)?,
            EntityKind::Character => seed_kind::<CharacterRow>(&up, dump, progress)?,
        };
        stats.kinds.insert(kind, kind_stats);
    }

    progress.on_phase(SeedPhase::UpdatingVersionMarker);
    AppSettings::new(tx.conn()).upsert(DICTIONARY_VERSION, &stats.hash)?;
    Ok(())
}

/// Apply one kind's rows.
fn seed_kind<T: EntityRow>(
    up: &Upserter<'_>,
    dump: &DumpFile,
    progress: &dyn SeedProgress,
) -> Result<KindStats, SeedError> {
    let kind = T::kind();
    let mut stats = KindStats::default();

    if !dump.has_table(kind.dump_table())? {
        log::warn!("Dump has no {} table, skipping", kind.dump_table());
        return Ok(stats);
    }

    let rows: Vec<T> = dump.read_rows()?;
    check_unique_names(kind, &rows)?;

    for (i, row) in rows.iter().enumerate() {
        let (mut record, created) = up.upsert::<T::Record>(row.name())?;
        let before = record.clone();
        row.apply(&mut record, up)?;

        if created {
            save(up.conn(), &mut record)?;
            stats.created += 1;
        } else if record != before {
            save(up.conn(), &mut record)?;
            stats.updated += 1;
        } else {
            stats.unchanged += 1;
        }

        progress.on_row(kind, i + 1, rows.len(), row.name());
    }

    log::debug!(
        "{}: {} created, {} updated, {} unchanged",
        <T::Record as Record>::COLLECTION,
        stats.created,
        stats.updated,
        stats.unchanged
    );
    Ok(stats)
}

fn check_unique_names<T: EntityRow>(kind: EntityKind, rows: &[T]) -> Result<(), SeedError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.name()) {
            return Err(SeedError::DuplicateName {
                kind,
                name: row.name().to_string(),
            });
        }
    }
    Ok(())
}
