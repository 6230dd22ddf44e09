use gbp_catalog::*;
use gbp_db::*;

#[test]
fn open_creates_database_and_storage() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = Store::open(&data_dir).unwrap();

    assert!(data_dir.join("data.db").exists());
    assert!(store.files().root().starts_with(&data_dir));
    assert_eq!(store.schema_version().unwrap(), CURRENT_VERSION);
}

#[test]
fn committed_transaction_keeps_records_and_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();

    let tx = store.transaction().unwrap();
    let mut wt = WeaponType::named("Sword");
    wt.id = gbp_db::ids::new_id();
    wt.icon = tx
        .files()
        .attach(
            WeaponType::COLLECTION,
            &wt.id,
            "",
            &NewFile::from_bytes(b"png".to_vec(), "sword.png"),
        )
        .unwrap();
    save(tx.conn(), &mut wt).unwrap();
    tx.commit().unwrap();

    let found: WeaponType = get_by_id(store.conn(), &wt.id).unwrap();
    let bytes = store
        .files()
        .read(WeaponType::COLLECTION, &found.id, &found.icon)
        .unwrap();
    assert_eq!(bytes, b"png");
}

#[test]
fn dropped_transaction_rolls_back_records_and_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();

    let path = {
        let tx = store.transaction().unwrap();
        let mut wt = WeaponType::named("Sword");
        wt.id = gbp_db::ids::new_id();
        wt.icon = tx
            .files()
            .attach(
                WeaponType::COLLECTION,
                &wt.id,
                "",
                &NewFile::from_bytes(vec![0; 4], "sword.png"),
            )
            .unwrap();
        save(tx.conn(), &mut wt).unwrap();
        let path = tx.files().path_of(WeaponType::COLLECTION, &wt.id, &wt.icon);
        assert!(path.exists());
        path
    };

    assert!(!path.exists());
    assert_eq!(count::<WeaponType>(store.conn()).unwrap(), 0);
}

#[test]
fn run_in_transaction_rolls_back_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();

    let result: Result<(), StoreError> = store.run_in_transaction(|tx| {
        save(tx.conn(), &mut WeaponType::named("Bow"))?;
        save(tx.conn(), &mut Special::named("bad order"))?;
        Ok(())
    });

    assert!(result.is_err());
    assert_eq!(count::<WeaponType>(store.conn()).unwrap(), 0);
}

#[test]
fn app_settings_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();
    let settings = AppSettings::new(store.conn());

    assert!(settings.dictionary_version().unwrap().is_none());
    assert!(settings.get(DICTIONARY_VERSION).unwrap_err().is_not_found());

    let first = settings.upsert(DICTIONARY_VERSION, "aaa").unwrap();
    let second = settings.upsert(DICTIONARY_VERSION, "bbb").unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.created, second.created);
    assert_eq!(settings.get(DICTIONARY_VERSION).unwrap(), "bbb");
    assert_eq!(count::<AppSetting>(store.conn()).unwrap(), 1);

    settings.delete(DICTIONARY_VERSION).unwrap();
    assert!(settings.find(DICTIONARY_VERSION).unwrap().is_none());
}

#[test]
fn dumps_are_unique_by_hash() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();
    let file = NewFile::from_bytes(b"SQLite format 3\0".to_vec(), "seed.db");

    assert!(latest_dump(store.conn()).unwrap().is_none());

    let dump = insert_dump(store.conn(), store.files(), "abc", &file, "first").unwrap();
    store.files().commit();
    assert!(dump.dump.starts_with("seed_"));
    assert!(dump_file_path(store.files(), &dump).exists());
    assert!(!dump.created.is_empty());

    let err = insert_dump(store.conn(), store.files(), "abc", &file, "again").unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));

    let second = insert_dump(store.conn(), store.files(), "def", &file, "second").unwrap();
    let latest = latest_dump(store.conn()).unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    let first = find_dump_by_hash(store.conn(), "abc").unwrap().unwrap();
    assert_eq!(first.notes, "first");
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 2);
}
