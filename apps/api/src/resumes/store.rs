use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

pub struct NewResume<'a> {
    pub user_id: Uuid,
    pub name: &'a str,
    pub text: &'a str,
    pub file_type: &'a str,
}

/// Inserts a resume and makes it the user's current one, in one transaction.
pub async fn insert_resume_as_current(
    pool: &PgPool,
    resume: NewResume<'_>,
) -> Result<ResumeRow, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (id, user_id, name, text, file_type)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(resume.user_id)
    .bind(resume.name)
    .bind(resume.text)
    .bind(resume.file_type)
    .fetch_one(&mut *tx)
    .await?;

    upsert_pointer(&mut tx, resume.user_id, Some(row.id)).await?;
    tx.commit().await?;

    info!(
        "Stored resume {} ({} chars) for user {}",
        row.id,
        row.text.chars().count(),
        row.user_id
    );
    Ok(row)
}

pub async fn list_resumes(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn get_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Deletes a resume. Its analyses cascade; a pointer to it is nulled.
/// Returns whether a row was removed.
pub async fn delete_resume(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() > 0 {
        info!("Deleted resume {resume_id} for user {user_id}");
    }
    Ok(result.rows_affected() > 0)
}

pub async fn current_resume(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT r.* FROM resume_sessions s
        JOIN resumes r ON r.id = s.current_resume_id
        WHERE s.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Points the user's session at one of their resumes.
/// Returns `false` when the resume does not exist or belongs to someone else.
pub async fn set_current(
    pool: &PgPool,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let owned: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Ok(false);
    }

    upsert_pointer(&mut tx, user_id, Some(resume_id)).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn clear_current(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    upsert_pointer(&mut tx, user_id, None).await?;
    tx.commit().await
}

async fn upsert_pointer(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    resume_id: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO resume_sessions (user_id, current_resume_id, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id) DO UPDATE SET
            current_resume_id = EXCLUDED.current_resume_id,
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(resume_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
