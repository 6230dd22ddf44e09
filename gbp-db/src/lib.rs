//! SQLite-backed live record store for the build planner.
//!
//! Provides the versioned schema (collections, fields and access rules),
//! typed CRUD over the reference dictionary, file attachments that follow
//! the surrounding transaction, the app-settings key/value store and the
//! dump history.

pub mod collections;
pub mod dumps;
pub mod error;
pub mod files;
pub mod ids;
pub mod operations;
pub mod records;
pub mod schema;
pub mod settings;
pub mod store;

pub use collections::{find_collection, list_collections, plan_collections};
pub use dumps::{dump_file_path, find_dump_by_hash, insert_dump, latest_dump, list_dumps};
pub use error::StoreError;
pub use files::{FileStorage, NewFile};
pub use operations::{
    count, delete, exists, find_all_by_field, find_by_id, find_first_by_field, get_by_id,
    list_all, save,
};
pub use records::{IconRecord, NamedRecord, Record, list_kind_json};
pub use schema::{CURRENT_VERSION, open_database, open_memory};
pub use settings::{AppSettings, DICTIONARY_VERSION};
pub use store::{Store, StoreTx};
