use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable resume storage. Production: S3/MinIO.
    pub storage: Arc<dyn ResumeStore>,
    pub tokens: TokenKeys,
    pub config: Config,
}
