use std::sync::{Arc, Mutex};

use gbp_catalog::PlanCollection;
use gbp_db::{Store, plan_collections};

use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Shared application state passed to every handler.
///
/// The store holds a single SQLite connection, so access is serialized
/// behind a mutex and always happens on the blocking pool.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub settings: Arc<Settings>,
    /// Plan collections, resolved once at startup.
    pub plans: Arc<Vec<PlanCollection>>,
}

impl AppState {
    pub fn new(store: Store, settings: Settings) -> AppResult<Self> {
        let plans = plan_collections(store.conn())?;
        log::debug!("Registered {} plan collections", plans.len());
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            settings: Arc::new(settings),
            plans: Arc::new(plans),
        })
    }

    /// Run `f` against the store on the blocking thread pool.
    pub async fn with_store<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Store) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store
                .lock()
                .map_err(|_| AppError::Internal("Store lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Store task failed: {e}")))?
    }
}
