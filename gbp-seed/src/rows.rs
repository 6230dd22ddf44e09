//! Row types of the dump file and their mapping to live records.
//!
//! Each kind gets one row struct. Relations are carried by name and icons
//! as raw bytes; [`EntityRow::apply`] turns a row into live fields and
//! [`EntityRow::extract`] goes the other way.

use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};

use gbp_catalog::{
    ArtifactSet, ArtifactType, Character, CharacterRole, DomainOfBlessing, Element, EntityKind,
    Special, Weapon, WeaponType,
};
use gbp_db::NamedRecord;

use crate::dump::Extractor;
use crate::error::SeedError;
use crate::upsert::Upserter;

/// Icon bytes carried in a dump row.
#[derive(Clone, PartialEq, Eq)]
pub struct IconBlob {
    pub filename: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for IconBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<icon {} ({} bytes)>", self.filename, self.content.len())
    }
}

/// One row of a dump table, bound to the live record type it seeds.
pub trait EntityRow: Sized {
    type Record: NamedRecord + Clone + PartialEq;

    /// Column definitions used when the table is (re)created.
    const TABLE_SQL: &'static str;
    /// Columns read and written, in [`EntityRow::sql_values`] order.
    const COLUMNS: &'static [&'static str];

    fn kind() -> EntityKind {
        <Self::Record as NamedRecord>::KIND
    }

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self>;
    fn sql_values(&self) -> Vec<Value>;
    fn name(&self) -> &str;

    /// Copy this row's fields onto a live record, resolving names to ids.
    fn apply(&self, record: &mut Self::Record, up: &Upserter<'_>) -> Result<(), SeedError>;

    /// Build a row from a live record, resolving ids to names.
    fn extract(record: &Self::Record, ex: &mut Extractor<'_>) -> Result<Self, SeedError>;
}

/// A JSON array of names stored in a TEXT column.
struct NameList(Vec<String>);

impl FromSql for NameList {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(NameList(Vec::new())),
            _ => {
                let text = value.as_str()?;
                if text.trim().is_empty() {
                    return Ok(NameList(Vec::new()));
                }
                serde_json::from_str(text)
                    .map(NameList)
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    }
}

fn name_list(names: &[String]) -> Value {
    Value::Text(serde_json::Value::from(names.to_vec()).to_string())
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::Text(s.clone()),
        None => Value::Null,
    }
}

/// Empty strings in optional relation columns mean "none".
fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn read_icon(row: &Row<'_>) -> rusqlite::Result<Option<IconBlob>> {
    let content: Option<Vec<u8>> = row.get("icon_content")?;
    let filename: Option<String> = row.get("icon_filename")?;
    Ok(content.map(|content| IconBlob {
        filename: filename.unwrap_or_default(),
        content,
    }))
}

fn icon_values(icon: &Option<IconBlob>) -> [Value; 2] {
    match icon {
        Some(icon) => [text(&icon.filename), Value::Blob(icon.content.clone())],
        None => [text(""), Value::Null],
    }
}

// ── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRow {
    pub name: String,
    pub order: i64,
    pub substat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRow {
    pub name: String,
    pub color: String,
    pub inverse_text_color: bool,
    pub icon: Option<IconBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRoleRow {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSetRow {
    pub name: String,
    pub rarity: String,
    pub icon: Option<IconBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactTypeRow {
    pub name: String,
    pub order: i64,
    /// Special names, order preserved.
    pub specials: Vec<String>,
    pub icon: Option<IconBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOfBlessingRow {
    pub name: String,
    /// ArtifactSet names.
    pub artifact_sets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponTypeRow {
    pub name: String,
    pub icon: Option<IconBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponRow {
    pub name: String,
    pub rarity: i64,
    pub weapon_type: String,
    pub special: Option<String>,
    pub icon: Option<IconBlob>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRow {
    pub name: String,
    pub rarity: i64,
    pub element: Option<String>,
    pub weapon_type: String,
    pub special: String,
    pub icon: Option<IconBlob>,
}

// ── Mapping ─────────────────────────────────────────────────────────────────

impl EntityRow for SpecialRow {
    type Record = Special;
    const TABLE_SQL: &'static str =
        r#"name TEXT PRIMARY KEY, "order" INTEGER NOT NULL, substat BOOLEAN NOT NULL DEFAULT 0"#;
    const COLUMNS: &'static [&'static str] = &["name", "order", "substat"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            order: row.get("order")?,
            substat: row.get("substat")?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            Value::Integer(self.order),
            Value::Integer(self.substat as i64),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Special, _up: &Upserter<'_>) -> Result<(), SeedError> {
        record.order = self.order;
        record.substat = self.substat;
        Ok(())
    }

    fn extract(record: &Special, _ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            order: record.order,
            substat: record.substat,
        })
    }
}

impl EntityRow for ElementRow {
    type Record = Element;
    const TABLE_SQL: &'static str = "name TEXT PRIMARY KEY, color TEXT NOT NULL, \
         inverse_text_color BOOLEAN NOT NULL DEFAULT 0, \
         icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "color",
        "inverse_text_color",
        "icon_filename",
        "icon_content",
    ];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            color: row.get("color")?,
            inverse_text_color: row.get("inverse_text_color")?,
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![
            text(&self.name),
            text(&self.color),
            Value::Integer(self.inverse_text_color as i64),
            filename,
            content,
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Element, up: &Upserter<'_>) -> Result<(), SeedError> {
        record.color = self.color.clone();
        record.inverse_text_color = self.inverse_text_color;
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &Element, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            color: record.color.clone(),
            inverse_text_color: record.inverse_text_color,
            icon: ex.icon(record)?,
        })
    }
}

impl EntityRow for CharacterRoleRow {
    type Record = CharacterRole;
    const TABLE_SQL: &'static str = "name TEXT PRIMARY KEY";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        vec![text(&self.name)]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _record: &mut CharacterRole, _up: &Upserter<'_>) -> Result<(), SeedError> {
        Ok(())
    }

    fn extract(record: &CharacterRole, _ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
        })
    }
}

impl EntityRow for ArtifactSetRow {
    type Record = ArtifactSet;
    const TABLE_SQL: &'static str = "name TEXT PRIMARY KEY, rarity TEXT NOT NULL DEFAULT '', \
         icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB";
    const COLUMNS: &'static [&'static str] = &["name", "rarity", "icon_filename", "icon_content"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![text(&self.name), text(&self.rarity), filename, content]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut ArtifactSet, up: &Upserter<'_>) -> Result<(), SeedError> {
        record.rarity = self.rarity.clone();
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &ArtifactSet, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            rarity: record.rarity.clone(),
            icon: ex.icon(record)?,
        })
    }
}

impl EntityRow for ArtifactTypeRow {
    type Record = ArtifactType;
    const TABLE_SQL: &'static str =
        r#"name TEXT PRIMARY KEY, "order" INTEGER NOT NULL, specials TEXT NOT NULL DEFAULT '[]', icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB"#;
    const COLUMNS: &'static [&'static str] =
        &["name", "order", "specials", "icon_filename", "icon_content"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        let NameList(specials) = row.get("specials")?;
        Ok(Self {
            name: row.get("name")?,
            order: row.get("order")?,
            specials,
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![
            text(&self.name),
            Value::Integer(self.order),
            name_list(&self.specials),
            filename,
            content,
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut ArtifactType, up: &Upserter<'_>) -> Result<(), SeedError> {
        record.order = self.order;
        record.specials = up
            .resolver()
            .resolve_many(EntityKind::Special, &self.specials)?;
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &ArtifactType, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            order: record.order,
            specials: ex
                .resolver()
                .names_of(EntityKind::Special, &record.specials)?,
            icon: ex.icon(record)?,
        })
    }
}

impl EntityRow for DomainOfBlessingRow {
    type Record = DomainOfBlessing;
    const TABLE_SQL: &'static str =
        "name TEXT PRIMARY KEY, artifact_sets TEXT NOT NULL DEFAULT '[]'";
    const COLUMNS: &'static [&'static str] = &["name", "artifact_sets"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        let NameList(artifact_sets) = row.get("artifact_sets")?;
        Ok(Self {
            name: row.get("name")?,
            artifact_sets,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        vec![text(&self.name), name_list(&self.artifact_sets)]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut DomainOfBlessing, up: &Upserter<'_>) -> Result<(), SeedError> {
        record.artifact_sets = up
            .resolver()
            .resolve_many(EntityKind::ArtifactSet, &self.artifact_sets)?;
        Ok(())
    }

    fn extract(record: &DomainOfBlessing, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            artifact_sets: ex
                .resolver()
                .names_of(EntityKind::ArtifactSet, &record.artifact_sets)?,
        })
    }
}

impl EntityRow for WeaponTypeRow {
    type Record = WeaponType;
    const TABLE_SQL: &'static str =
        "name TEXT PRIMARY KEY, icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB";
    const COLUMNS: &'static [&'static str] = &["name", "icon_filename", "icon_content"];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![text(&self.name), filename, content]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut WeaponType, up: &Upserter<'_>) -> Result<(), SeedError> {
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &WeaponType, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        Ok(Self {
            name: record.name.clone(),
            icon: ex.icon(record)?,
        })
    }
}

impl EntityRow for WeaponRow {
    type Record = Weapon;
    const TABLE_SQL: &'static str = "name TEXT PRIMARY KEY, rarity INTEGER NOT NULL, \
         weapon_type TEXT NOT NULL, special TEXT, \
         icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "rarity",
        "weapon_type",
        "special",
        "icon_filename",
        "icon_content",
    ];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            weapon_type: row.get("weapon_type")?,
            special: non_empty(row.get("special")?),
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![
            text(&self.name),
            Value::Integer(self.rarity),
            text(&self.weapon_type),
            opt_text(&self.special),
            filename,
            content,
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Weapon, up: &Upserter<'_>) -> Result<(), SeedError> {
        let resolver = up.resolver();
        record.rarity = self.rarity;
        record.weapon_type = resolver.resolve(EntityKind::WeaponType, &self.weapon_type)?;
        record.special = resolver.resolve_optional(EntityKind::Special, self.special.as_deref())?;
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &Weapon, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        let resolver = ex.resolver();
        let weapon_type = resolver.name_of(EntityKind::WeaponType, &record.weapon_type)?;
        let special = resolver.name_of_optional(EntityKind::Special, record.special.as_deref())?;
        Ok(Self {
            name: record.name.clone(),
            rarity: record.rarity,
            weapon_type,
            special,
            icon: ex.icon(record)?,
        })
    }
}

impl EntityRow for CharacterRow {
    type Record = Character;
    const TABLE_SQL: &'static str = "name TEXT PRIMARY KEY, rarity INTEGER NOT NULL, \
         element TEXT, weapon_type TEXT NOT NULL, special TEXT NOT NULL, \
         icon_filename TEXT NOT NULL DEFAULT '', icon_content BLOB";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "rarity",
        "element",
        "weapon_type",
        "special",
        "icon_filename",
        "icon_content",
    ];

    fn from_sql(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            rarity: row.get("rarity")?,
            element: non_empty(row.get("element")?),
            weapon_type: row.get("weapon_type")?,
            special: row.get("special")?,
            icon: read_icon(row)?,
        })
    }

    fn sql_values(&self) -> Vec<Value> {
        let [filename, content] = icon_values(&self.icon);
        vec![
            text(&self.name),
            Value::Integer(self.rarity),
            opt_text(&self.element),
            text(&self.weapon_type),
            text(&self.special),
            filename,
            content,
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, record: &mut Character, up: &Upserter<'_>) -> Result<(), SeedError> {
        let resolver = up.resolver();
        record.rarity = self.rarity;
        record.element = resolver.resolve_optional(EntityKind::Element, self.element.as_deref())?;
        record.weapon_type = resolver.resolve(EntityKind::WeaponType, &self.weapon_type)?;
        record.special = resolver.resolve(EntityKind::Special, &self.special)?;
        up.attach_icon(record, self.icon.as_ref())
    }

    fn extract(record: &Character, ex: &mut Extractor<'_>) -> Result<Self, SeedError> {
        let resolver = ex.resolver();
        let element = resolver.name_of_optional(EntityKind::Element, record.element.as_deref())?;
        let weapon_type = resolver.name_of(EntityKind::WeaponType, &record.weapon_type)?;
        let special = resolver.name_of(EntityKind::Special, &record.special)?;
        Ok(Self {
            name: record.name.clone(),
            rarity: record.rarity,
            element,
            weapon_type,
            special,
            icon: ex.icon(record)?,
        })
    }
}
