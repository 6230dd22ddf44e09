mod common;

use common::*;
use gbp_catalog::*;
use gbp_db::{count, find_first_by_field, list_all, list_dumps};
use gbp_seed::rows::*;
use gbp_seed::*;

#[test]
fn dump_then_reseed_reproduces_the_dictionary() {
    let (dir, source) = store();
    let seed_path = dir.path().join("seed.db");
    Fixture::default().write(&seed_path);
    seed(&source, &seed_path, &SilentProgress).unwrap();

    let dump_path = dir.path().join("dump.db");
    let stats = dump(&source, &dump_path, &SilentProgress).unwrap();
    assert_eq!(stats.total_rows(), 12);
    assert_eq!(stats.icons, 4);

    let (_target_dir, target) = store();
    seed(&target, &dump_path, &SilentProgress).unwrap();

    let names = |store: &gbp_db::Store| -> Vec<(String, i64, Option<String>)> {
        let weapons: Vec<Weapon> = list_all(store.conn()).unwrap();
        weapons
            .into_iter()
            .map(|w| (w.name, w.rarity, w.special.map(|_| "set".to_string())))
            .collect()
    };
    assert_eq!(names(&source), names(&target));

    let specials_source: Vec<Special> = list_all(source.conn()).unwrap();
    let specials_target: Vec<Special> = list_all(target.conn()).unwrap();
    let strip = |v: Vec<Special>| -> Vec<(String, i64, bool)> {
        v.into_iter()
            .map(|s| (s.name, s.order, s.substat))
            .collect()
    };
    assert_eq!(strip(specials_source), strip(specials_target));

    let bennett: Character = find_first_by_field(target.conn(), "name", &"Bennett")
        .unwrap()
        .unwrap();
    assert!(bennett.icon.starts_with("bennett_"));
    assert_eq!(
        target
            .files()
            .read("characters", &bennett.id, &bennett.icon)
            .unwrap(),
        b"bennett-icon"
    );
    assert_eq!(count::<Character>(target.conn()).unwrap(), 2);
}

#[test]
fn dump_rows_carry_names_and_slugified_icons() {
    let (dir, store) = store();
    let seed_path = dir.path().join("seed.db");
    Fixture::default().write(&seed_path);
    seed(&store, &seed_path, &SilentProgress).unwrap();

    let dump_path = dir.path().join("dump.db");
    dump(&store, &dump_path, &SilentProgress).unwrap();
    let file = DumpFile::open(&dump_path).unwrap();

    let weapons: Vec<WeaponRow> = file.read_rows().unwrap();
    assert_eq!(weapons.len(), 1);
    assert_eq!(weapons[0].weapon_type, "Sword");
    assert_eq!(weapons[0].special.as_deref(), Some("Crit Rate"));
    assert_eq!(weapons[0].icon, None);

    let sets: Vec<ArtifactSetRow> = file.read_rows().unwrap();
    let icon = sets[0].icon.as_ref().unwrap();
    assert_eq!(icon.filename, "gladiator_s_finale.webp");
    assert_eq!(icon.content, b"gladiator-icon");

    let types: Vec<ArtifactTypeRow> = file.read_rows().unwrap();
    assert_eq!(types[0].specials, vec!["HP%", "ATK%"]);
}

#[test]
fn dumping_again_replaces_tables() {
    let (dir, store) = store();
    let seed_path = dir.path().join("seed.db");
    Fixture::default().write(&seed_path);
    seed(&store, &seed_path, &SilentProgress).unwrap();

    let dump_path = dir.path().join("dump.db");
    dump(&store, &dump_path, &SilentProgress).unwrap();
    dump(&store, &dump_path, &SilentProgress).unwrap();

    let file = DumpFile::open(&dump_path).unwrap();
    let specials: Vec<SpecialRow> = file.read_rows().unwrap();
    assert_eq!(specials.len(), 3);
}

#[test]
fn empty_store_dumps_empty_tables() {
    let (dir, store) = store();
    let dump_path = dir.path().join("dump.db");
    let stats = dump(&store, &dump_path, &SilentProgress).unwrap();
    assert_eq!(stats.total_rows(), 0);

    let file = DumpFile::open(&dump_path).unwrap();
    for kind in EntityKind::ALL {
        assert!(file.has_table(kind.dump_table()).unwrap(), "{kind}");
    }
}

#[test]
fn dump_and_save_records_history_once_per_hash() {
    let (dir, store) = store();
    let seed_path = dir.path().join("seed.db");
    Fixture::default().write(&seed_path);
    seed(&store, &seed_path, &SilentProgress).unwrap();

    let dump_path = dir.path().join("dump.db");
    let (_, saved) = dump_and_save(&store, &dump_path, "weekly", &SilentProgress).unwrap();
    assert_eq!(saved.notes, "weekly");
    assert_eq!(saved.hash, hash_file(&dump_path).unwrap());

    let again = save_dump(&store, &dump_path, "other notes").unwrap();
    assert_eq!(again.id, saved.id);
    assert_eq!(list_dumps(store.conn()).unwrap().len(), 1);
}

#[test]
fn update_dictionary_version_uses_file_hash() {
    let (dir, store) = store();
    let path = dir.path().join("seed.db");
    Fixture::default().write(&path);

    let setting = update_dictionary_version(&store, &path).unwrap();
    assert_eq!(setting.key, gbp_db::DICTIONARY_VERSION);
    assert_eq!(setting.value, hash_file(&path).unwrap());
}
