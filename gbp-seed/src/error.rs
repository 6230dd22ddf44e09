use std::path::PathBuf;

use gbp_catalog::EntityKind;
use gbp_db::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpFileError {
    #[error("Dump file not found: {0}")]
    NotFound(PathBuf),
    #[error("SQLite error in dump file: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Malformed {table}.{column} in row '{name}': {message}")]
    Malformed {
        table: &'static str,
        column: &'static str,
        name: String,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Dump file error: {0}")]
    DumpFile(#[from] DumpFileError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A relation names a record that does not exist
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    /// More than one live record carries the same name
    #[error("{kind} name '{name}' matches {count} records")]
    AmbiguousName {
        kind: EntityKind,
        name: String,
        count: usize,
    },

    /// The dump file lists the same name twice for one kind
    #[error("{kind} '{name}' appears more than once in the dump")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("Dump not found: {0}")]
    DumpNotFound(String),
}

impl SeedError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means something requested does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DumpNotFound(_) | Self::DumpFile(DumpFileError::NotFound(_)) => true,
            Self::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}
