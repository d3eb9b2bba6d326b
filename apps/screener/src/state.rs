use sqlx::SqlitePool;

use crate::config::Config;
use crate::screening::pipeline::Services;

/// Shared application state injected into all route handlers via Axum
/// extractors. The service capabilities are initialized once at process
/// start and reused for every screening run.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub services: Services,
}
