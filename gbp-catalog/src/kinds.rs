//! Entity kinds of the reference dictionary and the naming table.
//!
//! Every place that needs a collection name, a dump table name, or the
//! relation layout of a kind goes through [`EntityKind`]. The names live in
//! one table ([`KINDS`]) so the live store and the dump format can never
//! drift apart.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Collection names shared by the store schema and the naming table.
pub mod collections {
    // Reference dictionary, one per entity kind.
    pub const SPECIALS: &str = "specials";
    pub const ELEMENTS: &str = "elements";
    pub const CHARACTER_ROLES: &str = "character_roles";
    pub const ARTIFACT_SETS: &str = "artifact_sets";
    pub const ARTIFACT_TYPES: &str = "artifact_types";
    pub const DOMAINS_OF_BLESSING: &str = "domains_of_blessing";
    pub const WEAPON_TYPES: &str = "weapon_types";
    pub const WEAPONS: &str = "weapons";
    pub const CHARACTERS: &str = "characters";

    /// Registry of every collection declared by the migrations.
    pub const REGISTRY: &str = "_collections";
    /// Process-wide key/value settings.
    pub const APP_SETTINGS: &str = "_app_settings";
    /// Append-only history of generated and uploaded dumps.
    pub const DB_DUMPS: &str = "_db_dumps";

    pub const USERS: &str = "users";
    pub const CHARACTER_PLANS: &str = "character_plans";
    pub const WEAPON_PLANS: &str = "weapon_plans";
    pub const ARTIFACT_SETS_PLANS: &str = "artifact_sets_plans";
    pub const ARTIFACT_TYPE_PLANS: &str = "artifact_type_plans";
    pub const TEAM_PLANS: &str = "team_plans";

    /// Plan collections exposed to the UI through the plans dictionary.
    pub const PLANS: [&str; 5] = [
        CHARACTER_PLANS,
        WEAPON_PLANS,
        ARTIFACT_SETS_PLANS,
        ARTIFACT_TYPE_PLANS,
        TEAM_PLANS,
    ];
}

/// A kind of reference entity.
///
/// Variant order is the dependency order used for seeding: every kind only
/// relates to kinds that come before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Special,
    Element,
    CharacterRole,
    ArtifactSet,
    ArtifactType,
    DomainOfBlessing,
    WeaponType,
    Weapon,
    Character,
}

/// A relation field of an entity kind, pointing at another kind by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Column name, identical in the live store and the dump file.
    pub field: &'static str,
    pub target: EntityKind,
    /// Multi-relation (stored as a JSON array) instead of a single reference.
    pub many: bool,
    pub required: bool,
}

struct KindInfo {
    kind: EntityKind,
    label: &'static str,
    collection: &'static str,
    dump_table: &'static str,
    has_icon: bool,
    relations: &'static [Relation],
}

const fn rel(field: &'static str, target: EntityKind, many: bool, required: bool) -> Relation {
    Relation {
        field,
        target,
        many,
        required,
    }
}

/// The naming table. Indexed by `EntityKind as usize`.
static KINDS: [KindInfo; 9] = [
    KindInfo {
        kind: EntityKind::Special,
        label: "Special",
        collection: collections::SPECIALS,
        dump_table: "specials",
        has_icon: false,
        relations: &[],
    },
    KindInfo {
        kind: EntityKind::Element,
        label: "Element",
        collection: collections::ELEMENTS,
        dump_table: "elements",
        has_icon: true,
        relations: &[],
    },
    KindInfo {
        kind: EntityKind::CharacterRole,
        label: "CharacterRole",
        collection: collections::CHARACTER_ROLES,
        dump_table: "character_roles",
        has_icon: false,
        relations: &[],
    },
    KindInfo {
        kind: EntityKind::ArtifactSet,
        label: "ArtifactSet",
        collection: collections::ARTIFACT_SETS,
        dump_table: "artifact_sets",
        has_icon: true,
        relations: &[],
    },
    KindInfo {
        kind: EntityKind::ArtifactType,
        label: "ArtifactType",
        collection: collections::ARTIFACT_TYPES,
        dump_table: "artifact_types",
        has_icon: true,
        relations: &[rel("specials", EntityKind::Special, true, true)],
    },
    KindInfo {
        kind: EntityKind::DomainOfBlessing,
        label: "DomainOfBlessing",
        collection: collections::DOMAINS_OF_BLESSING,
        dump_table: "domains_of_blessing",
        has_icon: false,
        relations: &[rel("artifact_sets", EntityKind::ArtifactSet, true, true)],
    },
    KindInfo {
        kind: EntityKind::WeaponType,
        label: "WeaponType",
        collection: collections::WEAPON_TYPES,
        dump_table: "weapon_types",
        has_icon: true,
        relations: &[],
    },
    KindInfo {
        kind: EntityKind::Weapon,
        label: "Weapon",
        collection: collections::WEAPONS,
        dump_table: "weapons",
        has_icon: true,
        relations: &[
            rel("weapon_type", EntityKind::WeaponType, false, true),
            rel("special", EntityKind::Special, false, false),
        ],
    },
    KindInfo {
        kind: EntityKind::Character,
        label: "Character",
        collection: collections::CHARACTERS,
        dump_table: "characters",
        has_icon: true,
        relations: &[
            rel("element", EntityKind::Element, false, false),
            rel("weapon_type", EntityKind::WeaponType, false, true),
            rel("special", EntityKind::Special, false, true),
        ],
    },
];

#[derive(Debug, Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownKind(pub String);

impl EntityKind {
    /// All kinds in seeding (dependency) order.
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Special,
        EntityKind::Element,
        EntityKind::CharacterRole,
        EntityKind::ArtifactSet,
        EntityKind::ArtifactType,
        EntityKind::DomainOfBlessing,
        EntityKind::WeaponType,
        EntityKind::Weapon,
        EntityKind::Character,
    ];

    fn info(self) -> &'static KindInfo {
        &KINDS[self as usize]
    }

    /// Human-readable label, e.g. "ArtifactSet".
    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Name of the live-store collection (and its SQL table).
    pub fn collection(self) -> &'static str {
        self.info().collection
    }

    /// Name of the table inside a dump file.
    pub fn dump_table(self) -> &'static str {
        self.info().dump_table
    }

    pub fn has_icon(self) -> bool {
        self.info().has_icon
    }

    pub fn relations(self) -> &'static [Relation] {
        self.info().relations
    }

    /// Look a kind up by its live collection name.
    pub fn from_collection(name: &str) -> Option<Self> {
        KINDS.iter().find(|k| k.collection == name).map(|k| k.kind)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = UnknownKind;

    /// Accepts the label ("WeaponType"), the collection name ("weapon_types")
    /// or the dump table name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KINDS
            .iter()
            .find(|k| {
                k.label.eq_ignore_ascii_case(s)
                    || k.collection.eq_ignore_ascii_case(s)
                    || k.dump_table.eq_ignore_ascii_case(s)
            })
            .map(|k| k.kind)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
