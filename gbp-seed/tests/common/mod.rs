#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use gbp_catalog::EntityKind;
use gbp_db::Store;
use gbp_seed::rows::*;
use gbp_seed::{DumpFile, SeedPhase, SeedProgress};

pub fn store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_in_memory(dir.path()).unwrap();
    (dir, store)
}

pub fn icon(filename: &str, content: &[u8]) -> Option<IconBlob> {
    Some(IconBlob {
        filename: filename.to_string(),
        content: content.to_vec(),
    })
}

/// Rows of a small but complete dump.
#[derive(Clone)]
pub struct Fixture {
    pub specials: Vec<SpecialRow>,
    pub elements: Vec<ElementRow>,
    pub character_roles: Vec<CharacterRoleRow>,
    pub artifact_sets: Vec<ArtifactSetRow>,
    pub artifact_types: Vec<ArtifactTypeRow>,
    pub domains: Vec<DomainOfBlessingRow>,
    pub weapon_types: Vec<WeaponTypeRow>,
    pub weapons: Vec<WeaponRow>,
    pub characters: Vec<CharacterRow>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            specials: vec![
                SpecialRow {
                    name: "Crit Rate".into(),
                    order: 1,
                    substat: true,
                },
                SpecialRow {
                    name: "ATK%".into(),
                    order: 2,
                    substat: true,
                },
                SpecialRow {
                    name: "HP%".into(),
                    order: 3,
                    substat: false,
                },
            ],
            elements: vec![ElementRow {
                name: "Pyro".into(),
                color: "#ef7938".into(),
                inverse_text_color: false,
                icon: icon("pyro.png", b"pyro-icon"),
            }],
            character_roles: vec![CharacterRoleRow { name: "DPS".into() }],
            artifact_sets: vec![ArtifactSetRow {
                name: "Gladiator's Finale".into(),
                rarity: "4-5".into(),
                icon: icon("gladiator_s_finale.webp", b"gladiator-icon"),
            }],
            artifact_types: vec![ArtifactTypeRow {
                name: "Sands".into(),
                order: 3,
                specials: vec!["HP%".into(), "ATK%".into()],
                icon: None,
            }],
            domains: vec![DomainOfBlessingRow {
                name: "Valley of Remembrance".into(),
                artifact_sets: vec!["Gladiator's Finale".into()],
            }],
            weapon_types: vec![WeaponTypeRow {
                name: "Sword".into(),
                icon: icon("sword.png", b"sword-icon"),
            }],
            weapons: vec![WeaponRow {
                name: "Iron Blade".into(),
                rarity: 3,
                weapon_type: "Sword".into(),
                special: Some("Crit Rate".into()),
                icon: None,
            }],
            characters: vec![
                CharacterRow {
                    name: "Bennett".into(),
                    rarity: 4,
                    element: Some("Pyro".into()),
                    weapon_type: "Sword".into(),
                    special: "HP%".into(),
                    icon: icon("bennett.png", b"bennett-icon"),
                },
                CharacterRow {
                    name: "Traveler".into(),
                    rarity: 5,
                    element: None,
                    weapon_type: "Sword".into(),
                    special: "ATK%".into(),
                    icon: None,
                },
            ],
        }
    }
}

fn write_table<T: EntityRow>(file: &DumpFile, rows: &[T]) {
    file.recreate_table::<T>().unwrap();
    for row in rows {
        file.insert(row).unwrap();
    }
}

impl Fixture {
    pub fn write(&self, path: &Path) {
        let file = DumpFile::create(path).unwrap();
        write_table(&file, &self.specials);
        write_table(&file, &self.elements);
        write_table(&file, &self.character_roles);
        write_table(&file, &self.artifact_sets);
        write_table(&file, &self.artifact_types);
        write_table(&file, &self.domains);
        write_table(&file, &self.weapon_types);
        write_table(&file, &self.weapons);
        write_table(&file, &self.characters);
    }
}

/// Count regular files below `dir`.
pub fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            count += count_files(&path);
        } else {
            count += 1;
        }
    }
    count
}

/// Records every phase it is told about.
#[derive(Default)]
pub struct RecordingProgress {
    pub phases: RefCell<Vec<SeedPhase>>,
}

impl SeedProgress for RecordingProgress {
    fn on_phase(&self, phase: SeedPhase) {
        self.phases.borrow_mut().push(phase);
    }

    fn on_row(&self, _kind: EntityKind, _current: usize, _total: usize, _name: &str) {}

    fn on_complete(&self, _message: &str) {}
}
