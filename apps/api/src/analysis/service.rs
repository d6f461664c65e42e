use tracing::info;

use crate::analysis::models::{AtsReport, JobMatchReport};
use crate::analysis::prompts::{
    ATS_PROMPT_TEMPLATE, ATS_SYSTEM, JOB_DESCRIPTION_FOCUS, JOB_MATCH_PROMPT_TEMPLATE,
    JOB_MATCH_SYSTEM,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{truncate_chars, MAX_PROMPT_RESUME_CHARS};
use crate::llm_client::LlmClient;

pub fn build_ats_prompt(resume_text: &str) -> String {
    ATS_PROMPT_TEMPLATE.replace(
        "{resume_text}",
        truncate_chars(resume_text, MAX_PROMPT_RESUME_CHARS),
    )
}

pub fn build_job_match_prompt(
    resume_text: &str,
    job_role: &str,
    job_description: Option<&str>,
) -> String {
    let job_description = job_description.map(str::trim).filter(|d| !d.is_empty());
    let (focus, block) = match job_description {
        Some(d) => (JOB_DESCRIPTION_FOCUS, format!("Job Description:\n{d}\n")),
        None => ("", String::new()),
    };

    JOB_MATCH_PROMPT_TEMPLATE
        .replace("{focus}", focus)
        .replace("{job_role}", job_role.trim())
        .replace("{job_description_block}", &block)
        .replace(
            "{resume_text}",
            truncate_chars(resume_text, MAX_PROMPT_RESUME_CHARS),
        )
}

/// Asks the model for an ATS review of a resume transcript.
pub async fn analyze_ats(llm: &LlmClient, resume_text: &str) -> Result<AtsReport, AppError> {
    let prompt = build_ats_prompt(resume_text);
    let report = llm.call_json::<AtsReport>(&prompt, ATS_SYSTEM).await?;

    info!("ATS analysis complete: overall score {}", report.overall_score);
    Ok(report)
}

/// Asks the model how well a resume fits a role. The request's role and
/// description are merged into the returned report.
pub async fn analyze_job_match(
    llm: &LlmClient,
    resume_text: &str,
    job_role: &str,
    job_description: Option<&str>,
) -> Result<JobMatchReport, AppError> {
    let prompt = build_job_match_prompt(resume_text, job_role, job_description);
    let mut report = llm
        .call_json::<JobMatchReport>(&prompt, JOB_MATCH_SYSTEM)
        .await?;

    report.job_role = Some(job_role.trim().to_string());
    report.job_description = job_description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    info!(
        "Job match analysis complete for '{}': match score {}",
        job_role.trim(),
        report.match_score
    );
    Ok(report)
}
