//! Seed and dump the reference dictionary.
//!
//! A dump is a standalone SQLite file with one table per entity kind.
//! Relations are stored by name and icons as raw bytes, so a dump can be
//! applied to any store. Seeding upserts every row by name inside a single
//! store transaction; dumping does the reverse.

pub mod dump;
pub mod dump_file;
pub mod error;
pub mod hasher;
pub mod progress;
pub mod resolver;
pub mod rows;
pub mod seed;
pub mod snapshot;
pub mod upsert;

pub use dump::{DumpStats, dump, dump_and_save, record_in, save_dump, update_dictionary_version};
pub use dump_file::DumpFile;
pub use error::{DumpFileError, SeedError};
pub use hasher::{hash_bytes, hash_file, write_hash};
pub use progress::{LogProgress, SeedProgress, SilentProgress};
pub use resolver::Resolver;
pub use rows::{EntityRow, IconBlob};
pub use seed::{KindStats, SeedPhase, SeedStats, seed, seed_then};
pub use snapshot::{
    SeedOutcome, SeedSource, generate, latest, restore, update_seed_if_changed, upload,
};
pub use upsert::Upserter;
