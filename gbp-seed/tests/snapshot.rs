mod common;

use common::*;
use gbp_catalog::*;
use gbp_db::{AppSettings, NewFile, count, latest_dump, list_dumps};
use gbp_seed::*;

fn source(dir: &std::path::Path) -> SeedSource {
    SeedSource {
        file: dir.join("seed.db"),
        hash_file: dir.join("seed.hash"),
        note_file: dir.join("seed.note"),
    }
}

#[test]
fn update_seed_if_changed_applies_once() {
    let (dir, store) = store();
    let src = source(dir.path());
    Fixture::default().write(&src.file);
    std::fs::write(&src.note_file, "Version 5.6\n").unwrap();

    let first = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    assert!(first.is_seeded());
    let dumps = list_dumps(store.conn()).unwrap();
    assert_eq!(dumps.len(), 1);
    assert_eq!(dumps[0].notes, "Version 5.6");

    let second = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    assert!(matches!(second, SeedOutcome::Unchanged { .. }));
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 1);
}

#[test]
fn update_seed_if_changed_follows_a_modified_file() {
    let (dir, store) = store();
    let src = source(dir.path());
    let mut fixture = Fixture::default();
    fixture.write(&src.file);
    update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    let old_version = AppSettings::new(store.conn()).dictionary_version().unwrap();

    fixture.weapons[0].rarity = 4;
    fixture.write(&src.file);
    let outcome = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();

    assert!(outcome.is_seeded());
    let new_version = AppSettings::new(store.conn()).dictionary_version().unwrap();
    assert_ne!(new_version, old_version);
    assert_eq!(new_version, Some(hash_file(&src.file).unwrap()));
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 2);
}

#[test]
fn precomputed_hash_file_is_trusted() {
    let (dir, store) = store();
    let src = source(dir.path());
    Fixture::default().write(&src.file);
    write_hash("already-applied", &src.hash_file).unwrap();
    AppSettings::new(store.conn())
        .upsert(gbp_db::DICTIONARY_VERSION, "already-applied")
        .unwrap();

    let outcome = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    assert!(!outcome.is_seeded());
    assert_eq!(count::<Weapon>(store.conn()).unwrap(), 0);
}

#[test]
fn matching_latest_dump_is_a_no_op() {
    let (dir, store) = store();
    let src = source(dir.path());
    Fixture::default().write(&src.file);
    save_dump(&store, &src.file, "").unwrap();

    let outcome = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    assert!(!outcome.is_seeded());
}

#[test]
fn failed_seed_is_not_recorded_and_retries() {
    let (dir, store) = store();
    let src = source(dir.path());
    Fixture::default().write(&src.file);

    // A file where the weapon type icon directory belongs.
    let blocker = dir.path().join("storage").join("weapon_types");
    std::fs::write(&blocker, b"").unwrap();
    let first = update_seed_if_changed(&store, &src, &SilentProgress);
    assert!(first.is_err());
    assert!(list_dumps(store.conn()).unwrap().is_empty());
    assert_eq!(
        AppSettings::new(store.conn()).dictionary_version().unwrap(),
        None
    );
    assert_eq!(count::<Weapon>(store.conn()).unwrap(), 0);

    std::fs::remove_file(&blocker).unwrap();
    let outcome = update_seed_if_changed(&store, &src, &SilentProgress).unwrap();
    assert!(outcome.is_seeded());
    assert_eq!(
        AppSettings::new(store.conn()).dictionary_version().unwrap(),
        Some(hash_file(&src.file).unwrap())
    );
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 1);
}

#[test]
fn rejected_upload_leaves_no_history() {
    let (_dir, store) = store();
    let garbage = b"definitely not sqlite, just text ".repeat(64);

    let result = upload(
        &store,
        NewFile::from_bytes(garbage, "upload.db"),
        "",
        &SilentProgress,
    );
    assert!(result.is_err());
    assert!(latest_dump(store.conn()).unwrap().is_none());
    assert!(latest(&store).unwrap().is_none());
}

#[test]
fn upload_records_and_seeds() {
    let (dir, store) = store();
    let path = dir.path().join("upload.db");
    Fixture::default().write(&path);
    let bytes = std::fs::read(&path).unwrap();

    let (saved, outcome) = upload(
        &store,
        NewFile::from_bytes(bytes.clone(), "upload.db"),
        "manual upload",
        &SilentProgress,
    )
    .unwrap();
    assert!(outcome.is_seeded());
    assert_eq!(saved.hash, hash_bytes(&bytes));
    assert_eq!(count::<Character>(store.conn()).unwrap(), 2);

    let (again, outcome) = upload(
        &store,
        NewFile::from_bytes(bytes, "upload.db"),
        "",
        &SilentProgress,
    )
    .unwrap();
    assert_eq!(again.id, saved.id);
    assert!(!outcome.is_seeded());
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 1);
}

#[test]
fn restore_reapplies_a_recorded_dump() {
    let (dir, store) = store();
    let mut fixture = Fixture::default();
    let first = dir.path().join("first.db");
    fixture.write(&first);
    let first_bytes = std::fs::read(&first).unwrap();
    let (first_dump, _) = upload(
        &store,
        NewFile::from_bytes(first_bytes, "first.db"),
        "",
        &SilentProgress,
    )
    .unwrap();

    fixture.weapons[0].rarity = 5;
    let second = dir.path().join("second.db");
    fixture.write(&second);
    upload(
        &store,
        NewFile::from_bytes(std::fs::read(&second).unwrap(), "second.db"),
        "",
        &SilentProgress,
    )
    .unwrap();

    restore(&store, &first_dump.id, &SilentProgress).unwrap();
    let blade: Weapon = gbp_db::find_first_by_field(store.conn(), "name", &"Iron Blade")
        .unwrap()
        .unwrap();
    assert_eq!(blade.rarity, 3);
    assert_eq!(
        AppSettings::new(store.conn()).dictionary_version().unwrap(),
        Some(first_dump.hash)
    );
}

#[test]
fn restore_unknown_dump_is_not_found() {
    let (_dir, store) = store();
    let err = restore(&store, "doesnotexist123", &SilentProgress).unwrap_err();
    assert!(matches!(err, SeedError::DumpNotFound(_)));
    assert!(err.is_not_found());
}

#[test]
fn generate_records_dump_and_version() {
    let (dir, store) = store();
    let path = dir.path().join("seed.db");
    Fixture::default().write(&path);
    seed(&store, &path, &SilentProgress).unwrap();

    let (stats, saved) = generate(&store, "generated", &SilentProgress).unwrap();
    assert_eq!(stats.total_rows(), 12);
    assert_eq!(saved.notes, "generated");
    assert_eq!(
        AppSettings::new(store.conn()).dictionary_version().unwrap(),
        Some(saved.hash.clone())
    );

    let (latest, latest_path) = latest(&store).unwrap().unwrap();
    assert_eq!(latest.id, saved.id);
    assert_eq!(hash_file(&latest_path).unwrap(), saved.hash);
    assert_eq!(latest_dump(store.conn()).unwrap().unwrap().id, saved.id);
}
