//! Key/value application settings (`_app_settings`).

use rusqlite::Connection;

use gbp_catalog::AppSetting;

use crate::error::StoreError;
use crate::operations::{self, find_first_by_field};
use crate::records::Record;

/// Key of the setting holding the hash of the last applied dump.
pub const DICTIONARY_VERSION: &str = "dictionaryVersion";

/// Accessor for the `_app_settings` collection.
pub struct AppSettings<'c> {
    conn: &'c Connection,
}

impl<'c> AppSettings<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn find(&self, key: &str) -> Result<Option<AppSetting>, StoreError> {
        find_first_by_field(self.conn, "key", &key)
    }

    /// Value of `key`; a missing key is `NotFound`.
    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        self.find(key)?
            .map(|s| s.value)
            .ok_or_else(|| StoreError::not_found(AppSetting::COLLECTION, "key", key))
    }

    /// Create the setting or overwrite its value.
    pub fn upsert(&self, key: &str, value: &str) -> Result<AppSetting, StoreError> {
        let mut setting = self.find(key)?.unwrap_or_else(|| AppSetting {
            key: key.to_string(),
            ..Default::default()
        });
        setting.value = value.to_string();
        operations::save(self.conn, &mut setting)?;
        log::debug!("Setting {} = {}", key, value);
        Ok(setting)
    }

    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let setting = self
            .find(key)?
            .ok_or_else(|| StoreError::not_found(AppSetting::COLLECTION, "key", key))?;
        operations::delete::<AppSetting>(self.conn, &setting.id)
    }

    /// The hash of the last applied dump, if any.
    pub fn dictionary_version(&self) -> Result<Option<String>, StoreError> {
        Ok(self.find(DICTIONARY_VERSION)?.map(|s| s.value))
    }
}
