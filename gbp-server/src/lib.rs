//! HTTP server for the build planner.
//!
//! Serves the `/api` endpoints around the seed/dump lifecycle, the
//! reference collections, and the static UI bundle.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use gbp_db::Store;
use gbp_seed::{LogProgress, SeedOutcome, update_seed_if_changed};

pub use config::{ConfigError, Settings};
pub use error::{AppError, AppResult, ServeError};
pub use routes::router;
pub use state::AppState;

/// Apply the bundled seed if it differs from what the store already holds.
///
/// Failures are logged and otherwise ignored so the server still starts.
pub fn startup_seed(store: &Store, settings: &Settings) {
    let source = settings.seed_source();
    if !source.file.is_file() {
        log::info!("No bundled seed at {}", source.file.display());
        return;
    }
    match update_seed_if_changed(store, &source, &LogProgress) {
        Ok(SeedOutcome::Seeded(stats)) => log::info!(
            "Startup seed applied ({} created, {} updated)",
            stats.created(),
            stats.updated()
        ),
        Ok(SeedOutcome::Unchanged { hash }) => log::info!("Dictionary up to date ({})", hash),
        Err(e) => log::error!("Startup seed failed: {}", e),
    }
}

/// Open the store, run the startup seed check, and serve until Ctrl-C.
pub async fn serve(settings: Settings) -> Result<(), ServeError> {
    let store = Store::open(&settings.data_dir)?;
    startup_seed(&store, &settings);

    if settings.superuser_token().is_none() {
        log::warn!("No superuser token configured; dump endpoints will reject every request");
    }

    let addr = settings.http.addr.clone();
    let state = AppState::new(store, settings)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
