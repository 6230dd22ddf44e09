//! SQLite schema creation and migration.
//!
//! The schema is a list of numbered migrations. Each one creates tables and
//! registers the collections it declares (with their access rules) in the
//! `_collections` registry. Migrations only ever add.

use rusqlite::{Connection, params};
use thiserror::Error;

use gbp_catalog::{CollectionType, collections};

use crate::ids;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: database is at version {found}, newest known is {expected}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Access rule letting anyone list or view a collection.
const PUBLIC: Option<&str> = Some("");
/// No rule: superuser only.
const LOCKED: Option<&str> = None;
const OWNER_RULE: Option<&str> = Some(r#"@request.auth.id != "" && user = @request.auth.id"#);
const PLAN_OWNER_RULE: Option<&str> = Some(
    r#"@request.auth.id != "" && character_plan.user = @request.auth.id"#,
);

struct CollectionDecl {
    name: &'static str,
    collection_type: CollectionType,
    list_rule: Option<&'static str>,
    view_rule: Option<&'static str>,
}

const fn decl(
    name: &'static str,
    collection_type: CollectionType,
    list_rule: Option<&'static str>,
    view_rule: Option<&'static str>,
) -> CollectionDecl {
    CollectionDecl {
        name,
        collection_type,
        list_rule,
        view_rule,
    }
}

/// Superuser-only bookkeeping collection.
const fn system(name: &'static str) -> CollectionDecl {
    decl(name, CollectionType::System, LOCKED, LOCKED)
}

/// Reference-dictionary collection, readable by anyone.
const fn reference(name: &'static str) -> CollectionDecl {
    decl(name, CollectionType::Base, PUBLIC, PUBLIC)
}

/// Collection whose records are listed and viewed through `rule`.
const fn owned(name: &'static str, rule: Option<&'static str>) -> CollectionDecl {
    decl(name, CollectionType::Base, rule, rule)
}

struct Migration {
    version: i32,
    name: &'static str,
    sql: &'static str,
    collections: &'static [CollectionDecl],
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "system_collections",
        sql: SYSTEM_SQL,
        collections: &[
            system(collections::APP_SETTINGS),
            system(collections::DB_DUMPS),
        ],
    },
    Migration {
        version: 2,
        name: "reference_dictionary",
        sql: REFERENCE_SQL,
        collections: &[
            reference(collections::SPECIALS),
            reference(collections::ELEMENTS),
            reference(collections::CHARACTER_ROLES),
            reference(collections::ARTIFACT_SETS),
            reference(collections::ARTIFACT_TYPES),
            reference(collections::WEAPON_TYPES),
            reference(collections::WEAPONS),
            reference(collections::CHARACTERS),
        ],
    },
    Migration {
        version: 3,
        name: "domains_of_blessing",
        sql: DOMAINS_SQL,
        collections: &[reference(collections::DOMAINS_OF_BLESSING)],
    },
    Migration {
        version: 4,
        name: "plans",
        sql: PLANS_SQL,
        collections: &[
            owned(collections::USERS, LOCKED),
            owned(collections::CHARACTER_PLANS, OWNER_RULE),
            owned(collections::WEAPON_PLANS, PLAN_OWNER_RULE),
            owned(collections::ARTIFACT_SETS_PLANS, PLAN_OWNER_RULE),
            owned(collections::ARTIFACT_TYPE_PLANS, PLAN_OWNER_RULE),
            owned(collections::TEAM_PLANS, PLAN_OWNER_RULE),
        ],
    },
];

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 4;

/// Open or create a store database at the given path and bring it up to date.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    migrate(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrate(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='_migrations')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Apply every migration newer than the database's version.
///
/// Each migration runs in its own transaction together with its version
/// record. Returns the number of migrations applied.
pub fn migrate(conn: &Connection) -> Result<usize, SchemaError> {
    conn.execute_batch(BOOTSTRAP_SQL)?;

    let from_version = schema_version(conn)?;
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        log::debug!(
            "Applying migration {} ({})",
            migration.version,
            migration.name
        );
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        for collection in migration.collections {
            register_collection(&tx, collection)?;
        }
        tx.execute(
            "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;
        applied += 1;
    }

    if applied > 0 {
        log::info!(
            "Applied {} migration(s), schema now at version {}",
            applied,
            CURRENT_VERSION
        );
    }
    Ok(applied)
}

fn register_collection(conn: &Connection, decl: &CollectionDecl) -> Result<(), SchemaError> {
    let id = format!("pbc_{}", ids::random_string(10));
    conn.execute(
        "INSERT INTO _collections (id, name, type, list_rule, view_rule)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
            type = excluded.type,
            list_rule = excluded.list_rule,
            view_rule = excluded.view_rule",
        params![
            id,
            decl.name,
            decl.collection_type.as_str(),
            decl.list_rule,
            decl.view_rule,
        ],
    )?;
    Ok(())
}

const BOOTSTRAP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER NOT NULL,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS _collections (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL DEFAULT 'base',
    list_rule TEXT,
    view_rule TEXT
);
"#;

const SYSTEM_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS _app_settings (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_app_settings_key ON _app_settings(key);

CREATE TABLE IF NOT EXISTS _db_dumps (
    id TEXT PRIMARY KEY,
    hash TEXT NOT NULL,
    dump TEXT NOT NULL,
    notes TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_db_dumps_hash ON _db_dumps(hash);
CREATE INDEX IF NOT EXISTS idx_db_dumps_created ON _db_dumps(created);
"#;

const REFERENCE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS specials (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    "order" INTEGER NOT NULL,
    substat BOOLEAN NOT NULL DEFAULT 0,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_specials_name ON specials(name);

CREATE TABLE IF NOT EXISTS elements (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    inverse_text_color BOOLEAN NOT NULL DEFAULT 0,
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_elements_name ON elements(name);

CREATE TABLE IF NOT EXISTS character_roles (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_character_roles_name ON character_roles(name);

CREATE TABLE IF NOT EXISTS artifact_sets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    rarity TEXT NOT NULL DEFAULT '',
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_artifact_sets_name ON artifact_sets(name);

-- specials: JSON array of specials.id, order preserved
CREATE TABLE IF NOT EXISTS artifact_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    "order" INTEGER NOT NULL,
    specials TEXT NOT NULL DEFAULT '[]',
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_artifact_types_name ON artifact_types(name);

CREATE TABLE IF NOT EXISTS weapon_types (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_weapon_types_name ON weapon_types(name);

CREATE TABLE IF NOT EXISTS weapons (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    rarity INTEGER NOT NULL,
    weapon_type TEXT NOT NULL REFERENCES weapon_types(id),
    special TEXT REFERENCES specials(id),
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_weapons_name ON weapons(name);
CREATE INDEX IF NOT EXISTS idx_weapons_weapon_type ON weapons(weapon_type);

CREATE TABLE IF NOT EXISTS characters (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    rarity INTEGER NOT NULL,
    element TEXT REFERENCES elements(id),
    weapon_type TEXT NOT NULL REFERENCES weapon_types(id),
    special TEXT NOT NULL REFERENCES specials(id),
    icon TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_characters_name ON characters(name);
"#;

const DOMAINS_SQL: &str = r#"
-- artifact_sets: JSON array of artifact_sets.id
CREATE TABLE IF NOT EXISTS domains_of_blessing (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    artifact_sets TEXT NOT NULL DEFAULT '[]',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_domains_of_blessing_name ON domains_of_blessing(name);
"#;

const PLANS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS character_plans (
    id TEXT PRIMARY KEY,
    user TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    character TEXT NOT NULL REFERENCES characters(id),
    character_role TEXT REFERENCES character_roles(id),
    constellation_current INTEGER NOT NULL DEFAULT 0,
    constellation_target INTEGER NOT NULL DEFAULT 0,
    level_current INTEGER NOT NULL DEFAULT 0,
    level_target INTEGER NOT NULL DEFAULT 1,
    talent_atk_current INTEGER NOT NULL DEFAULT 1,
    talent_atk_target INTEGER NOT NULL DEFAULT 1,
    talent_skill_current INTEGER NOT NULL DEFAULT 1,
    talent_skill_target INTEGER NOT NULL DEFAULT 1,
    talent_burst_current INTEGER NOT NULL DEFAULT 1,
    talent_burst_target INTEGER NOT NULL DEFAULT 1,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_character_plans_user ON character_plans(user);

CREATE TABLE IF NOT EXISTS weapon_plans (
    id TEXT PRIMARY KEY,
    character_plan TEXT NOT NULL REFERENCES character_plans(id) ON DELETE CASCADE,
    weapon TEXT NOT NULL REFERENCES weapons(id),
    level_current INTEGER NOT NULL DEFAULT 0,
    level_target INTEGER NOT NULL DEFAULT 1,
    refinement_current INTEGER NOT NULL DEFAULT 1,
    refinement_target INTEGER NOT NULL DEFAULT 1,
    tag TEXT NOT NULL DEFAULT '',
    "order" INTEGER NOT NULL DEFAULT 0,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifact_sets_plans (
    id TEXT PRIMARY KEY,
    character_plan TEXT NOT NULL REFERENCES character_plans(id) ON DELETE CASCADE,
    artifact_sets TEXT NOT NULL DEFAULT '[]',
    "order" INTEGER NOT NULL DEFAULT 0,
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artifact_type_plans (
    id TEXT PRIMARY KEY,
    character_plan TEXT NOT NULL REFERENCES character_plans(id) ON DELETE CASCADE,
    artifact_type TEXT NOT NULL REFERENCES artifact_types(id),
    special TEXT NOT NULL REFERENCES specials(id),
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS team_plans (
    id TEXT PRIMARY KEY,
    character_plan TEXT NOT NULL REFERENCES character_plans(id) ON DELETE CASCADE,
    characters TEXT NOT NULL DEFAULT '[]',
    created TEXT NOT NULL,
    updated TEXT NOT NULL
);
"#;
