use sqlx::SqlitePool;

/// Shared handle passed to every HTTP handler. Constructed once in `main`
/// (or test setup) and cloned per request; nothing reaches for a global.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool_clone(&self) -> SqlitePool {
        self.pool.clone()
    }
}
