//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::models::candidate_email;
use crate::analysis::service::{analyze_ats, analyze_job_match};
use crate::analysis::store::{
    latest_analysis_for_resume, list_analyses, upsert_analysis, NewAnalysis,
};
use crate::errors::AppError;
use crate::models::analysis::{AnalysisKind, AnalysisRow};
use crate::models::resume::ResumeRow;
use crate::resumes::store::get_resume;
use crate::routes::UserIdQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobMatchRequest {
    pub job_role: String,
    #[serde(default)]
    pub job_description: Option<String>,
}

async fn load_resume(state: &AppState, user_id: Uuid, id: Uuid) -> Result<ResumeRow, AppError> {
    get_resume(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

fn to_stored_json<T: Serialize>(report: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(report)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode analysis: {e}")))
}

/// POST /api/v1/resumes/:id/ats
pub async fn handle_ats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalysisRow>, AppError> {
    let resume = load_resume(&state, params.user_id, id).await?;
    let report = analyze_ats(&state.llm, &resume.text).await?;
    let data = to_stored_json(&report)?;
    let email = candidate_email(&data);

    let row = upsert_analysis(
        &state.db,
        NewAnalysis {
            user_id: params.user_id,
            resume_id: resume.id,
            kind: AnalysisKind::Ats,
            candidate_email: email.as_deref(),
            data: &data,
        },
    )
    .await?;

    Ok(Json(row))
}

/// POST /api/v1/resumes/:id/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<JobMatchRequest>,
) -> Result<Json<AnalysisRow>, AppError> {
    if request.job_role.trim().is_empty() {
        return Err(AppError::Validation("job_role cannot be empty".to_string()));
    }

    let resume = load_resume(&state, params.user_id, id).await?;
    let report = analyze_job_match(
        &state.llm,
        &resume.text,
        &request.job_role,
        request.job_description.as_deref(),
    )
    .await?;
    let data = to_stored_json(&report)?;

    let email = candidate_email(&data);

    let row = upsert_analysis(
        &state.db,
        NewAnalysis {
            user_id: params.user_id,
            resume_id: resume.id,
            kind: AnalysisKind::JobMatch,
            candidate_email: email.as_deref(),
            data: &data,
        },
    )
    .await?;

    Ok(Json(row))
}

/// GET /api/v1/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AnalysisRow>>, AppError> {
    Ok(Json(list_analyses(&state.db, params.user_id).await?))
}

/// GET /api/v1/resumes/:id/analysis/:kind
pub async fn handle_latest_analysis(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AnalysisRow>, AppError> {
    let kind: AnalysisKind = kind.parse().map_err(AppError::Validation)?;
    latest_analysis_for_resume(&state.db, params.user_id, id, kind)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No {kind} analysis for resume {id}")))
}
