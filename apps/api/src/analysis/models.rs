//! Typed views of the model's analysis replies.
//!
//! Every field defaults when absent, and unknown fields are carried through
//! `extra` so the stored JSON keeps whatever the model returned.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionScore {
    pub score: f64,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified_skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtsSections {
    pub formatting: SectionScore,
    pub keywords: SectionScore,
    pub experience: SectionScore,
    pub education: SectionScore,
    pub skills: SectionScore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateDetails {
    pub name: String,
    pub email: String,
    pub contact_links: Vec<String>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub work_experience: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AtsReport {
    pub overall_score: f64,
    pub sections: AtsSections,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub ats_compatibility: String,
    /// Absent when the model found no candidate; such analyses are never ranked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_details: Option<CandidateDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendations {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
    pub to_enhance: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillMatch {
    pub technical: f64,
    pub soft: f64,
    pub domain: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMatchReport {
    pub match_score: f64,
    pub hireability_probability: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub missing_skills: Vec<String>,
    pub recommendations: Recommendations,
    pub skill_match: SkillMatch,
    /// Filled in from the request, not by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Key an analysis is superseded under: the email in its own `candidateDetails`.
/// Job-match reports carry no details, so they always resolve to `None` and
/// accumulate instead of replacing each other.
pub fn candidate_email(data: &Value) -> Option<String> {
    // Compared case-insensitively; "N/A" is the model's placeholder for no email.
    data.pointer("/candidateDetails/email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case("N/A"))
        .map(|e| e.to_lowercase())
}
