use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::BookRepository;

/// The shared application state.
///
/// Holds the resources every request handler needs: the pool built once at
/// startup, the book repository wired to it, and the loaded configuration.
/// Cloneable for use with Axum's request extraction system.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool, kept for health probes.
    pub db: sqlx::SqlitePool,
    /// The book repository; owns its own handle of the pool.
    pub books: BookRepository,
    /// The application configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        Self { books: BookRepository::new(db.clone()), db, config: Arc::new(config) }
    }
}
