//! Axum route handlers for the Resume API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::validation::validate_upload;
use crate::extraction::ExtractionSource;
use crate::models::resume::ResumeRow;
use crate::resumes::store::{
    clear_current, current_resume, delete_resume, get_resume, insert_resume_as_current,
    list_resumes, set_current, NewResume,
};
use crate::resumes::{is_meaningful, TOO_SHORT_MESSAGE};
use crate::routes::UserIdQuery;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub resume: ResumeRow,
    pub extracted_from: ExtractionSource,
}

#[derive(Debug, Deserialize)]
pub struct SetCurrentRequest {
    pub resume_id: Uuid,
}

struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("resume")
            .to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile {
            name,
            content_type,
            bytes,
        });
    }
    Err(AppError::Validation(format!(
        "multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// POST /api/v1/resumes
///
/// Validates and extracts an uploaded resume, stores the transcript and
/// makes it the user's current resume.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let upload = read_upload(multipart).await?;
    let document = validate_upload(
        &upload.content_type,
        upload.bytes,
        state.config.max_upload_bytes,
    )?;

    let extracted = state.extractor.extract(&document).await?;
    if !is_meaningful(&extracted.text) {
        return Err(AppError::ExtractionFailed(TOO_SHORT_MESSAGE.to_string()));
    }

    let resume = insert_resume_as_current(
        &state.db,
        NewResume {
            user_id: params.user_id,
            name: &upload.name,
            text: &extracted.text,
            file_type: document.media_type.as_mime(),
        },
    )
    .await?;

    info!(
        "Uploaded '{}' as resume {} via {:?}",
        resume.name, resume.id, extracted.source
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            resume,
            extracted_from: extracted.source,
        }),
    ))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    Ok(Json(list_resumes(&state.db, params.user_id).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    get_resume(&state.db, params.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !delete_resume(&state.db, params.user_id, id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/resumes/current
pub async fn handle_get_current(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    current_resume(&state.db, params.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No current resume".to_string()))
}

/// PUT /api/v1/resumes/current
pub async fn handle_set_current(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(request): Json<SetCurrentRequest>,
) -> Result<StatusCode, AppError> {
    if !set_current(&state.db, params.user_id, request.resume_id).await? {
        return Err(AppError::NotFound(format!(
            "Resume {} not found",
            request.resume_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/resumes/current
pub async fn handle_clear_current(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    clear_current(&state.db, params.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
