//! Typed mapping between live record structs and their SQL tables.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use rusqlite::{Connection, Row};

use gbp_catalog::{
    AppSetting, ArtifactSet, ArtifactType, Character, CharacterRole, DbDump, DomainOfBlessing,
    Element, EntityKind, Special, Weapon, WeaponType, collections,
};

use crate::error::StoreError;
use crate::operations::{self, list_all};

/// A struct stored as one row of a collection table.
///
/// Every table has `id`, `created` and `updated` besides the data columns
/// listed in [`Record::COLUMNS`].
pub trait Record: Sized {
    const COLLECTION: &'static str;
    /// Data columns in the order [`Record::values`] returns them.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn values(&self) -> Vec<Value>;

    /// Check field constraints before a write.
    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        Ok(())
    }

    /// Receive the stored timestamps after a write.
    fn set_timestamps(&mut self, _created: String, _updated: String) {}
}

/// A reference-dictionary record keyed by its unique `name`.
pub trait NamedRecord: Record {
    const KIND: EntityKind;

    /// A fresh, unsaved record with only the name set.
    fn named(name: &str) -> Self;
    fn name(&self) -> &str;
}

/// A named record carrying an `icon` file field.
pub trait IconRecord: NamedRecord {
    /// Stored file name of the icon, empty when none is attached.
    fn icon(&self) -> &str;
    fn set_icon(&mut self, stored_name: String);
}

/// A JSON array of record ids stored in a TEXT column.
struct IdList(Vec<String>);

impl FromSql for IdList {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        serde_json::from_str(text)
            .map(IdList)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn id_list(ids: &[String]) -> Value {
    Value::Text(serde_json::Value::from(ids.to_vec()).to_string())
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: &Option<String>) -> Value {
    match s {
        Some(s) if !s.is_empty() => Value::Text(s.clone()),
        _ => Value::Null,
    }
}

// ── Validation helpers ──────────────────────────────────────────────────────

fn require_text(collection: &str, field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(collection, field, "cannot be blank"));
    }
    Ok(())
}

fn require_range(
    collection: &str,
    field: &str,
    value: i64,
    min: i64,
    max: Option<i64>,
) -> Result<(), StoreError> {
    if value < min || max.is_some_and(|max| value > max) {
        let message = match max {
            Some(max) => format!("must be between {} and {}, got {}", min, max, value),
            None => format!("must be at least {}, got {}", min, value),
        };
        return Err(StoreError::validation(collection, field, message));
    }
    Ok(())
}

fn require_relation(
    conn: &Connection,
    collection: &str,
    field: &str,
    target: EntityKind,
    id: &str,
) -> Result<(), StoreError> {
    if id.is_empty() {
        return Err(StoreError::validation(collection, field, "cannot be blank"));
    }
    if !operations::exists(conn, target.collection(), id)? {
        return Err(StoreError::validation(
            collection,
            field,
            format!("no {} record with id '{}'", target.collection(), id),
        ));
    }
    Ok(())
}

fn require_relations(
    conn: &Connection,
    collection: &str,
    field: &str,
    target: EntityKind,
    ids: &[String],
    max_select: usize,
) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Err(StoreError::validation(collection, field, "cannot be blank"));
    }
    if ids.len() > max_select {
        return Err(StoreError::validation(
            collection,
            field,
            format!("at most {} entries allowed, got {}", max_select, ids.len()),
        ));
    }
    for id in ids {
        require_relation(conn, collection, field, target, id)?;
    }
    Ok(())
}

const MIN_RARITY: i64 = 1;
const MAX_RARITY: i64 = 5;
const MIN_ORDER: i64 = 1;

// ── Reference dictionary ────────────────────────────────────────────────────

impl Record for Special {
    const COLLECTION: &'static str = collections::SPECIALS;
    const COLUMNS: &'static [&'static str] = &["name", "order", "substat"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            order: row.get("order")?,
            substat: row.get("substat")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.order),
            Value::Integer(self.substat as i64),
        ]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_range(Self::COLLECTION, "order", self.order, MIN_ORDER, None)
    }
}

impl Record for Element {
    const COLLECTION: &'static str = collections::ELEMENTS;
    const COLUMNS: &'static [&'static str] = &["name", "color", "inverse_text_color", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            inverse_text_color: row.get("inverse_text_color")?,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.color),
            Value::Integer(self.inverse_text_color as i64),
            text(&self.icon),
        ]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_text(Self::COLLECTION, "color", &self.color)
    }
}

impl Record for CharacterRole {
    const COLLECTION: &'static str = collections::CHARACTER_ROLES;
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)
    }
}

impl Record for ArtifactSet {
    const COLLECTION: &'static str = collections::ARTIFACT_SETS;
    const COLUMNS: &'static [&'static str] = &["name", "rarity", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.rarity), text(&self.icon)]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)
    }
}

impl Record for ArtifactType {
    const COLLECTION: &'static str = collections::ARTIFACT_TYPES;
    const COLUMNS: &'static [&'static str] = &["name", "order", "specials", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let IdList(specials) = row.get("specials")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            order: row.get("order")?,
            specials,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.order),
            id_list(&self.specials),
            text(&self.icon),
        ]
    }

    fn validate(&self, conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_range(Self::COLLECTION, "order", self.order, MIN_ORDER, None)?;
        require_relations(
            conn,
            Self::COLLECTION,
            "specials",
            EntityKind::Special,
            &self.specials,
            50,
        )
    }
}

impl Record for DomainOfBlessing {
    const COLLECTION: &'static str = collections::DOMAINS_OF_BLESSING;
    const COLUMNS: &'static [&'static str] = &["name", "artifact_sets"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let IdList(artifact_sets) = row.get("artifact_sets")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            artifact_sets,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), id_list(&self.artifact_sets)]
    }

    fn validate(&self, conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_relations(
            conn,
            Self::COLLECTION,
            "artifact_sets",
            EntityKind::ArtifactSet,
            &self.artifact_sets,
            2,
        )
    }
}

impl Record for WeaponType {
    const COLLECTION: &'static str = collections::WEAPON_TYPES;
    const COLUMNS: &'static [&'static str] = &["name", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.name), text(&self.icon)]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)
    }
}

impl Record for Weapon {
    const COLLECTION: &'static str = collections::WEAPONS;
    const COLUMNS: &'static [&'static str] = &["name", "rarity", "weapon_type", "special", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            weapon_type: row.get("weapon_type")?,
            special: row.get("special")?,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.rarity),
            text(&self.weapon_type),
            opt_text(&self.special),
            text(&self.icon),
        ]
    }

    fn validate(&self, conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_range(
            Self::COLLECTION,
            "rarity",
            self.rarity,
            MIN_RARITY,
            Some(MAX_RARITY),
        )?;
        require_relation(
            conn,
            Self::COLLECTION,
            "weapon_type",
            EntityKind::WeaponType,
            &self.weapon_type,
        )?;
        if let Some(special) = self.special.as_deref().filter(|s| !s.is_empty()) {
            require_relation(
                conn,
                Self::COLLECTION,
                "special",
                EntityKind::Special,
                special,
            )?;
        }
        Ok(())
    }
}

impl Record for Character {
    const COLLECTION: &'static str = collections::CHARACTERS;
    const COLUMNS: &'static [&'static str] =
        &["name", "rarity", "element", "weapon_type", "special", "icon"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            element: row.get("element")?,
            weapon_type: row.get("weapon_type")?,
            special: row.get("special")?,
            icon: row.get("icon")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.rarity),
            opt_text(&self.element),
            text(&self.weapon_type),
            text(&self.special),
            text(&self.icon),
        ]
    }

    fn validate(&self, conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "name", &self.name)?;
        require_range(
            Self::COLLECTION,
            "rarity",
            self.rarity,
            MIN_RARITY,
            Some(MAX_RARITY),
        )?;
        if let Some(element) = self.element.as_deref().filter(|s| !s.is_empty()) {
            require_relation(
                conn,
                Self::COLLECTION,
                "element",
                EntityKind::Element,
                element,
            )?;
        }
        require_relation(
            conn,
            Self::COLLECTION,
            "weapon_type",
            EntityKind::WeaponType,
            &self.weapon_type,
        )?;
        require_relation(
            conn,
            Self::COLLECTION,
            "special",
            EntityKind::Special,
            &self.special,
        )
    }
}

macro_rules! named_record {
    ($ty:ty, $kind:expr) => {
        impl NamedRecord for $ty {
            const KIND: EntityKind = $kind;

            fn named(name: &str) -> Self {
                Self {
                    name: name.to_string(),
                    ..Default::default()
                }
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

macro_rules! icon_record {
    ($ty:ty) => {
        impl IconRecord for $ty {
            fn icon(&self) -> &str {
                &self.icon
            }

            fn set_icon(&mut self, stored_name: String) {
                self.icon = stored_name;
            }
        }
    };
}

named_record!(Special, EntityKind::Special);
named_record!(Element, EntityKind::Element);
named_record!(CharacterRole, EntityKind::CharacterRole);
named_record!(ArtifactSet, EntityKind::ArtifactSet);
named_record!(ArtifactType, EntityKind::ArtifactType);
named_record!(DomainOfBlessing, EntityKind::DomainOfBlessing);
named_record!(WeaponType, EntityKind::WeaponType);
named_record!(Weapon, EntityKind::Weapon);
named_record!(Character, EntityKind::Character);

icon_record!(Element);
icon_record!(ArtifactSet);
icon_record!(ArtifactType);
icon_record!(WeaponType);
icon_record!(Weapon);
icon_record!(Character);

// ── System collections ──────────────────────────────────────────────────────

impl Record for AppSetting {
    const COLLECTION: &'static str = collections::APP_SETTINGS;
    const COLUMNS: &'static [&'static str] = &["key", "value"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            key: row.get("key")?,
            value: row.get("value")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.key), text(&self.value)]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "key", &self.key)?;
        require_text(Self::COLLECTION, "value", &self.value)
    }

    fn set_timestamps(&mut self, created: String, updated: String) {
        self.created = created;
        self.updated = updated;
    }
}

impl Record for DbDump {
    const COLLECTION: &'static str = collections::DB_DUMPS;
    const COLUMNS: &'static [&'static str] = &["hash", "dump", "notes"];

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            hash: row.get("hash")?,
            dump: row.get("dump")?,
            notes: row.get("notes")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![text(&self.hash), text(&self.dump), text(&self.notes)]
    }

    fn validate(&self, _conn: &Connection) -> Result<(), StoreError> {
        require_text(Self::COLLECTION, "hash", &self.hash)?;
        require_text(Self::COLLECTION, "dump", &self.dump)
    }

    fn set_timestamps(&mut self, created: String, updated: String) {
        self.created = created;
        self.updated = updated;
    }
}

/// All records of a reference kind as JSON objects, in insertion order.
pub fn list_kind_json(
    conn: &Connection,
    kind: EntityKind,
) -> Result<Vec<serde_json::Value>, StoreError> {
    fn to_json<R: Record + serde::Serialize>(
        conn: &Connection,
    ) -> Result<Vec<serde_json::Value>, StoreError> {
        list_all::<R>(conn)?
            .iter()
            .map(|r| serde_json::to_value(r).map_err(StoreError::from))
            .collect()
    }

    match kind {
        EntityKind::Special => to_json::<Special>(conn),
        EntityKind::Element => to_json::<Element>(conn),
        EntityKind::CharacterRole => to_json::<CharacterRole>(conn),
        EntityKind::ArtifactSet => to_json::<ArtifactSet>(conn),
        EntityKind::ArtifactType => to_json::<ArtifactType>(conn),
        EntityKind::DomainOfBlessing => to_json::<DomainOfBlessing>(conn),
        EntityKind::WeaponType => to_json::<WeaponType>(conn),
        EntityKind::Weapon => to_json::<Weapon>(conn),
        EntityKind::Character => to_json::<Character>(conn),
    }
}
