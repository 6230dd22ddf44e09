//! `/api` routes and the static UI fallback.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
};

use gbp_catalog::{EntityKind, PlanCollection, UnknownKind};
use gbp_db::{AppSettings, NewFile, find_collection, list_kind_json};
use gbp_seed::{LogProgress, SeedError, SeedOutcome, generate, latest, restore, upload};

use crate::auth::{Superuser, is_superuser};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let max_upload = state.settings.http.max_upload_bytes;
    let ui_dir = state.settings.ui_dir.clone();

    let api = Router::new()
        .route("/dictionaryVersion", get(dictionary_version))
        .route("/plansCollections", get(plans_collections))
        .route("/dump/generate", post(generate_dump))
        .route(
            "/dump/upload",
            post(upload_dump).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/dump/restore/{dump_id}", post(restore_dump))
        .route("/dump/latest_seed.db", get(latest_seed))
        .route("/collections/{collection}/records", get(list_records))
        .fallback(api_not_found);

    let ui = ServeDir::new(&ui_dir).fallback(ServeFile::new(ui_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .fallback_service(ui)
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn api_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No API route for {}", uri.path()))
}

// ── Dictionary ──────────────────────────────────────────────────────────────

async fn dictionary_version(State(state): State<AppState>) -> AppResult<Json<String>> {
    let version = state
        .with_store(|store| Ok(AppSettings::new(store.conn()).dictionary_version()?))
        .await?;
    version
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Dictionary version is not set".to_string()))
}

async fn plans_collections(State(state): State<AppState>) -> Json<Vec<PlanCollection>> {
    Json(state.plans.as_ref().clone())
}

/// All records of a reference collection, gated by its list rule.
async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let kind = EntityKind::from_collection(&collection).ok_or(UnknownKind(collection))?;
    let superuser = is_superuser(&headers, &state.settings);

    let items = state
        .with_store(move |store| {
            let info = find_collection(store.conn(), kind.collection())?.ok_or_else(|| {
                AppError::NotFound(format!("Collection {} is not registered", kind.collection()))
            })?;
            if !info.is_publicly_listable() && !superuser {
                return Err(AppError::Unauthorized(format!(
                    "Only superusers can list {}",
                    info.name
                )));
            }
            Ok(list_kind_json(store.conn(), kind)?)
        })
        .await?;

    Ok(Json(json!({ "totalItems": items.len(), "items": items })))
}

// ── Dumps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateRequest {
    notes: String,
}

async fn generate_dump(
    _: Superuser,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let request: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let (stats, saved) = state
        .with_store(move |store| Ok(generate(store, &request.notes, &LogProgress)?))
        .await?;
    log::info!(
        "Generated dump {} ({} rows, {} icons)",
        saved.id,
        stats.total_rows(),
        stats.icons
    );

    Ok(Json(json!({ "status": "ok", "id": saved.id, "hash": saved.hash })))
}

async fn upload_dump(
    _: Superuser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let mut dump = None;
    let mut notes = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("dump") => {
                let file_name = field.file_name().unwrap_or("seed.db").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read dump: {e}")))?;
                dump = Some(NewFile::from_bytes(bytes.to_vec(), file_name));
            }
            Some("notes") => {
                notes = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Cannot read notes: {e}")))?;
            }
            other => log::debug!("Ignoring upload field {:?}", other),
        }
    }

    let file = dump.ok_or_else(|| AppError::BadRequest("Missing 'dump' file".to_string()))?;
    if file.content.is_empty() {
        return Err(AppError::BadRequest("Uploaded dump is empty".to_string()));
    }

    let (saved, outcome) = state
        .with_store(move |store| Ok(upload(store, file, &notes, &LogProgress)?))
        .await?;

    let status = match &outcome {
        SeedOutcome::Seeded(stats) => {
            log::info!(
                "Seeded from uploaded dump {} ({} created, {} updated)",
                saved.id,
                stats.created(),
                stats.updated()
            );
            "seeded"
        }
        SeedOutcome::Unchanged { .. } => "unchanged",
    };
    Ok(Json(json!({ "status": status, "id": saved.id, "hash": saved.hash })))
}

async fn restore_dump(
    _: Superuser,
    State(state): State<AppState>,
    Path(dump_id): Path<String>,
) -> AppResult<Json<Value>> {
    let stats = state
        .with_store(move |store| Ok(restore(store, &dump_id, &LogProgress)?))
        .await?;
    log::info!(
        "Restore finished ({} created, {} updated, {} unchanged)",
        stats.created(),
        stats.updated(),
        stats.unchanged()
    );
    Ok(Json(json!({ "status": "ok", "hash": stats.hash })))
}

async fn latest_seed(State(state): State<AppState>) -> AppResult<Response> {
    let (hash, bytes) = state
        .with_store(|store| {
            let (dump, path) = latest(store)?
                .ok_or_else(|| AppError::NotFound("No dump has been recorded".to_string()))?;
            let bytes = std::fs::read(&path).map_err(|e| SeedError::io(&path, e))?;
            Ok((dump.hash, bytes))
        })
        .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/vnd.sqlite3".to_string()),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"latest_seed.db\"".to_string(),
        ),
        (header::ETAG, format!("\"{hash}\"")),
    ];
    Ok((headers, bytes).into_response())
}
