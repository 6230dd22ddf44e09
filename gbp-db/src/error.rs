use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;

/// Errors raised by the live record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing an attached file failed
    #[error("File error at {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Record not found: {collection} with {field} '{value}'")]
    NotFound {
        collection: String,
        field: String,
        value: String,
    },

    #[error("Validation failed for {collection}.{field}: {message}")]
    Validation {
        collection: String,
        field: String,
        message: String,
    },

    /// A unique constraint rejected the write
    #[error("Duplicate value in {collection}: {detail}")]
    Duplicate { collection: String, detail: String },

    #[error("Unknown field '{field}' in collection {collection}")]
    UnknownField { collection: String, field: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

impl StoreError {
    pub fn not_found(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(
        collection: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            collection: collection.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
