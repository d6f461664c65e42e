pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::handlers as analysis;
use crate::ranking::handlers as ranking;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// Headroom for multipart boundaries and headers around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Session scope carried by every user-facing request.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_upload),
        )
        .route(
            "/api/v1/resumes/current",
            get(resumes::handle_get_current)
                .put(resumes::handle_set_current)
                .delete(resumes::handle_clear_current),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        // Analyses
        .route("/api/v1/resumes/:id/ats", post(analysis::handle_ats))
        .route(
            "/api/v1/resumes/:id/job-match",
            post(analysis::handle_job_match),
        )
        .route(
            "/api/v1/resumes/:id/analysis/:kind",
            get(analysis::handle_latest_analysis),
        )
        .route("/api/v1/analyses", get(analysis::handle_list_analyses))
        // Candidates
        .route("/api/v1/candidates/search", post(ranking::handle_search))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
