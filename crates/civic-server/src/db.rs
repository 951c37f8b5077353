//! Bridge between async handlers and the synchronous store.

use std::sync::{Arc, Mutex};

use civic_store::Database;

use crate::error::ApiError;

/// Shared handle to the one open [`Database`].
///
/// rusqlite is blocking, so every call runs on tokio's blocking pool while
/// holding the connection mutex.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<Mutex<Database>>,
}

impl DbHandle {
    pub fn new(db: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Database) -> Result<R, ApiError> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| ApiError::Internal(format!("DB lock poisoned: {e}")))?;
            f(&guard)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("DB task panicked: {e}")))?
    }
}
