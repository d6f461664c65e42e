use sqlx::PgPool;

use crate::config::Config;
use crate::extraction::Extractor;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub config: Config,
    /// Text extraction pipeline; OCR collaborators are swappable for tests.
    pub extractor: Extractor,
}
