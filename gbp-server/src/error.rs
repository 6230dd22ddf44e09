use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gbp_catalog::UnknownKind;
use gbp_db::StoreError;
use gbp_seed::{DumpFileError, SeedError};
use serde_json::json;
use thiserror::Error;

/// Errors returned by API handlers, rendered as `{"error": message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::UnknownKind(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Store(e) => store_status(e),
            AppError::Seed(e) => seed_status(e),
        }
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::NotFound { .. } | StoreError::UnknownCollection(_) => StatusCode::NOT_FOUND,
        StoreError::Validation { .. }
        | StoreError::Duplicate { .. }
        | StoreError::UnknownField { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn seed_status(e: &SeedError) -> StatusCode {
    match e {
        SeedError::DumpNotFound(_) | SeedError::DumpFile(DumpFileError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        // The dump itself is unusable: not a database, or inconsistent data.
        SeedError::DumpFile(_)
        | SeedError::NotFound { .. }
        | SeedError::AmbiguousName { .. }
        | SeedError::DuplicateName { .. } => StatusCode::BAD_REQUEST,
        SeedError::Store(e) => store_status(e),
        SeedError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Startup error: {0}")]
    App(#[from] AppError),

    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}
