use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::analysis::{AnalysisKind, AnalysisRow};
use crate::ranking::{Candidate, CandidateSource};

/// Parameters for storing one analysis.
pub struct NewAnalysis<'a> {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub kind: AnalysisKind,
    pub candidate_email: Option<&'a str>,
    pub data: &'a Value,
}

/// Stores an analysis, replacing any live one for the same (user, email, kind).
/// Analyses without an email never conflict and are always inserted.
pub async fn upsert_analysis(
    pool: &PgPool,
    analysis: NewAnalysis<'_>,
) -> Result<AnalysisRow, sqlx::Error> {
    let row: AnalysisRow = sqlx::query_as(
        r#"
        INSERT INTO analyses (id, user_id, resume_id, kind, candidate_email, data)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, candidate_email, kind) WHERE candidate_email IS NOT NULL
        DO UPDATE SET
            id = EXCLUDED.id,
            resume_id = EXCLUDED.resume_id,
            data = EXCLUDED.data,
            created_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(analysis.user_id)
    .bind(analysis.resume_id)
    .bind(analysis.kind.as_str())
    .bind(analysis.candidate_email)
    .bind(analysis.data)
    .fetch_one(pool)
    .await?;

    info!(
        "Stored {} analysis {} for resume {} (user {})",
        analysis.kind, row.id, row.resume_id, row.user_id
    );
    Ok(row)
}

/// All analyses for a user, newest first.
pub async fn list_analyses(pool: &PgPool, user_id: Uuid) -> Result<Vec<AnalysisRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM analyses WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn latest_analysis_for_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
    kind: AnalysisKind,
) -> Result<Option<AnalysisRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM analyses
        WHERE user_id = $1 AND resume_id = $2 AND kind = $3
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(resume_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await
}

#[derive(FromRow)]
struct CandidateRow {
    id: Uuid,
    resume_id: Uuid,
    data: Value,
    created_at: chrono::DateTime<chrono::Utc>,
    resume_name: String,
    resume_text: Option<String>,
}

/// ATS analyses joined with their resumes, as ranking candidates.
/// Analyses without candidate details are skipped.
pub async fn load_ats_candidates(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Candidate>, sqlx::Error> {
    let rows: Vec<CandidateRow> = sqlx::query_as(
        r#"
        SELECT a.id, a.resume_id, a.data, a.created_at,
               r.name AS resume_name, r.text AS resume_text
        FROM analyses a
        JOIN resumes r ON r.id = a.resume_id
        WHERE a.user_id = $1 AND a.kind = 'ats'
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            Candidate::from_ats_analysis(CandidateSource {
                analysis_id: row.id,
                resume_id: row.resume_id,
                data: &row.data,
                analyzed_at: row.created_at,
                resume_name: &row.resume_name,
                resume_text: row.resume_text.as_deref(),
            })
        })
        .collect())
}
