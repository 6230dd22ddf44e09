//! Reference dictionary data model for the build planner.
//!
//! This crate defines the entity kinds that make up the game dictionary,
//! the single naming table mapping each kind to its live collection and
//! dump table, and the typed live-record structures. It has no database
//! dependencies; `gbp-db` persists these types and `gbp-seed` moves them
//! in and out of dump files.

pub mod kinds;
pub mod slug;
pub mod types;

pub use kinds::{EntityKind, Relation, UnknownKind, collections};
pub use slug::icon_file_name;
pub use types::*;
