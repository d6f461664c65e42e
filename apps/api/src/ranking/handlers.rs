use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::store::load_ats_candidates;
use crate::errors::AppError;
use crate::ranking::{clamp_limit, rank, RankedCandidate};
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub candidates: Vec<RankedCandidate>,
    pub total_analyzed: usize,
}

/// POST /api/v1/candidates/search
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let limit = clamp_limit(request.limit);
    let candidates = load_ats_candidates(&state.db, params.user_id).await?;
    let total_analyzed = candidates.len();

    let ranked = rank(
        request.job_description.as_deref().unwrap_or_default(),
        candidates,
        limit,
    )?;

    debug!(
        "Candidate search for user {}: {} of {} returned",
        params.user_id,
        ranked.len(),
        total_analyzed
    );

    Ok(Json(SearchResponse {
        candidates: ranked,
        total_analyzed,
    }))
}
