//! Live record types.
//!
//! These mirror the rows of the live store. Relation fields hold live record
//! ids; icon fields hold the stored file name (empty when no icon is
//! attached).

use serde::{Deserialize, Serialize};

// ── Reference dictionary ────────────────────────────────────────────────────

/// A stat that can appear as a main stat or substat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Special {
    pub id: String,
    pub name: String,
    pub order: i64,
    pub substat: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub name: String,
    /// CSS color used for the element badge.
    pub color: String,
    pub inverse_text_color: bool,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRole {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub id: String,
    pub name: String,
    /// Free-form rarity label, e.g. "4-5".
    pub rarity: String,
    pub icon: String,
}

/// An artifact slot (flower, plume, …) and the main stats it can roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactType {
    pub id: String,
    pub name: String,
    pub order: i64,
    /// Ordered ids of `Special` records.
    pub specials: Vec<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOfBlessing {
    pub id: String,
    pub name: String,
    /// Ids of `ArtifactSet` records.
    pub artifact_sets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponType {
    pub id: String,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    pub rarity: i64,
    pub weapon_type: String,
    pub special: Option<String>,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub rarity: i64,
    /// Travelers have no fixed element.
    pub element: Option<String>,
    pub weapon_type: String,
    pub special: String,
    pub icon: String,
}

// ── System collections ──────────────────────────────────────────────────────

/// One entry of the process-wide key/value settings store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSetting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub created: String,
    pub updated: String,
}

/// A stored snapshot of the reference dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbDump {
    pub id: String,
    /// Lowercase hex SHA-256 of the dump file.
    pub hash: String,
    /// Stored file name of the dump file.
    pub dump: String,
    pub notes: String,
    pub created: String,
    pub updated: String,
}

/// Whether a collection is part of the framework or user-facing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Base,
    System,
}

impl CollectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Base => "base",
            CollectionType::System => "system",
        }
    }

    /// Parse the stored form; anything unrecognized is treated as `Base`.
    pub fn from_str_loose(s: &str) -> Self {
        if s.eq_ignore_ascii_case("system") {
            CollectionType::System
        } else {
            CollectionType::Base
        }
    }
}

/// A registered collection and its access rules.
///
/// A rule of `None` means superuser only; `Some("")` means public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    pub collection_type: CollectionType,
    pub list_rule: Option<String>,
    pub view_rule: Option<String>,
}

impl CollectionInfo {
    pub fn is_publicly_listable(&self) -> bool {
        self.list_rule.as_deref() == Some("")
    }
}

/// Entry of the plans dictionary served to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCollection {
    pub id: String,
    pub name: String,
}
