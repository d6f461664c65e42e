//! Candidate Ranking: orders previously analyzed resumes against a job description.
//!
//! This is a naive bag-of-tokens heuristic used only for local ordering.
//! The model's own job-match analysis lives in `analysis`.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 50;
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    #[error("limit must be between 1 and 50, got {0}")]
    InvalidLimit(usize),
}

/// A candidate profile lifted from a stored ATS analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub analysis_id: Uuid,
    pub resume_id: Uuid,
    pub name: String,
    pub email: String,
    pub score: f64,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
    pub resume_name: String,
    /// Used for matching only; never serialized back to clients.
    #[serde(skip)]
    pub resume_text: Option<String>,
}

/// Source rows a `Candidate` is built from.
pub struct CandidateSource<'a> {
    pub analysis_id: Uuid,
    pub resume_id: Uuid,
    pub data: &'a Value,
    pub analyzed_at: DateTime<Utc>,
    pub resume_name: &'a str,
    pub resume_text: Option<&'a str>,
}

impl Candidate {
    /// Builds a candidate from opaque ATS JSON. Returns `None` when the
    /// analysis carries no `candidateDetails`; missing fields fall back to defaults.
    pub fn from_ats_analysis(source: CandidateSource<'_>) -> Option<Self> {
        let details = source.data.get("candidateDetails").filter(|d| d.is_object())?;

        Some(Self {
            analysis_id: source.analysis_id,
            resume_id: source.resume_id,
            name: non_empty_str(details.get("name")).unwrap_or("Unknown").to_string(),
            email: non_empty_str(details.get("email")).unwrap_or("N/A").to_string(),
            score: source
                .data
                .get("overallScore")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            skills: string_list(details.get("skills")),
            experience: string_list(details.get("workExperience")),
            education: string_list(details.get("education")),
            analyzed_at: source.analyzed_at,
            resume_name: source.resume_name.to_string(),
            resume_text: source.resume_text.map(String::from),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    /// Token hits against the job description; absent when none was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
}

/// Clamps a caller-supplied limit into the accepted range.
pub fn clamp_limit(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as usize,
    }
}

/// Lower-cases and splits on runs of non-word characters. Duplicates are kept.
pub fn tokenize(job_description: &str) -> Vec<String> {
    job_description
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Counts tokens occurring as substrings of the lower-cased resume text.
pub fn match_score(tokens: &[String], resume_text: Option<&str>) -> u32 {
    let Some(text) = resume_text else {
        return 0;
    };
    let text = text.to_lowercase();
    tokens.iter().filter(|t| text.contains(t.as_str())).count() as u32
}

pub fn rank(
    job_description: &str,
    candidates: Vec<Candidate>,
    limit: usize,
) -> Result<Vec<RankedCandidate>, RankError> {
    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(RankError::InvalidLimit(limit));
    }

    let mut ranked: Vec<RankedCandidate> = if job_description.trim().is_empty() {
        let mut ranked: Vec<_> = candidates
            .into_iter()
            .map(|candidate| RankedCandidate {
                candidate,
                match_score: None,
            })
            .collect();
        ranked.sort_by(|a, b| b.candidate.score.total_cmp(&a.candidate.score));
        ranked
    } else {
        let tokens = tokenize(job_description);
        let mut ranked: Vec<_> = candidates
            .into_iter()
            .map(|candidate| {
                let hits = match_score(&tokens, candidate.resume_text.as_deref());
                RankedCandidate {
                    candidate,
                    match_score: Some(hits),
                }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| b.candidate.score.total_cmp(&a.candidate.score))
        });
        ranked
    };

    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(name: &str, score: f64, resume_text: Option<&str>) -> Candidate {
        Candidate {
            analysis_id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            score,
            skills: vec![],
            experience: vec![],
            education: vec![],
            analyzed_at: Utc::now(),
            resume_name: format!("{name}.pdf"),
            resume_text: resume_text.map(String::from),
        }
    }

    fn scores(ranked: &[RankedCandidate]) -> Vec<f64> {
        ranked.iter().map(|r| r.candidate.score).collect()
    }

    #[test]
    fn test_no_job_description_sorts_by_score() {
        let candidates = vec![
            candidate("A", 90.0, None),
            candidate("B", 70.0, None),
            candidate("C", 95.0, None),
        ];
        let ranked = rank("", candidates, 10).unwrap();
        assert_eq!(scores(&ranked), vec![95.0, 90.0, 70.0]);
        assert!(ranked.iter().all(|r| r.match_score.is_none()));
    }

    #[test]
    fn test_whitespace_job_description_counts_as_empty() {
        let ranked = rank(
            "  \n ",
            vec![candidate("A", 10.0, Some("rust")), candidate("B", 20.0, None)],
            5,
        )
        .unwrap();
        assert_eq!(scores(&ranked), vec![20.0, 10.0]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let candidates = (0..8).map(|i| candidate("X", i as f64, None)).collect();
        let ranked = rank("", candidates, 3).unwrap();
        assert_eq!(scores(&ranked), vec![7.0, 6.0, 5.0]);
    }

    #[test]
    fn test_more_token_hits_beats_higher_score() {
        let candidates = vec![
            candidate("HighScore", 99.0, Some("Java developer")),
            candidate("GoodMatch", 40.0, Some("Senior Rust engineer, Kubernetes, Postgres")),
        ];
        let ranked = rank("Rust engineer with Kubernetes", candidates, 10).unwrap();
        assert_eq!(ranked[0].candidate.name, "GoodMatch");
        assert_eq!(ranked[0].match_score, Some(3));
        assert_eq!(ranked[1].match_score, Some(0));
    }

    #[test]
    fn test_ties_broken_by_score() {
        let candidates = vec![
            candidate("Low", 50.0, Some("python")),
            candidate("High", 80.0, Some("python")),
        ];
        let ranked = rank("Python", candidates, 10).unwrap();
        assert_eq!(scores(&ranked), vec![80.0, 50.0]);
    }

    #[test]
    fn test_missing_resume_text_scores_zero_but_is_kept() {
        let candidates = vec![
            candidate("NoText", 90.0, None),
            candidate("Matches", 10.0, Some("go")),
            candidate("AlsoNoText", 95.0, None),
        ];
        let ranked = rank("go", candidates, 10).unwrap();
        let names: Vec<_> = ranked.iter().map(|r| r.candidate.name.as_str()).collect();
        assert_eq!(names, vec!["Matches", "AlsoNoText", "NoText"]);
        assert_eq!(ranked[1].match_score, Some(0));
    }

    #[test]
    fn test_repeated_tokens_count_per_occurrence() {
        let tokens = tokenize("Rust, rust and RUST!");
        assert_eq!(tokens, vec!["rust", "rust", "and", "rust"]);
        assert_eq!(match_score(&tokens, Some("I write Rust")), 3);
    }

    #[test]
    fn test_tokens_match_as_substrings() {
        let tokens = tokenize("go");
        // "go" occurs inside "Google"
        assert_eq!(match_score(&tokens, Some("Worked at Google")), 1);
    }

    #[test]
    fn test_tokenize_splits_on_non_word_runs() {
        assert_eq!(
            tokenize("C++/Rust -- node_js; 5+ yrs"),
            vec!["c", "rust", "node_js", "5", "yrs"]
        );
        assert!(tokenize("--- !!!").is_empty());
    }

    #[test]
    fn test_empty_candidates_is_empty() {
        assert!(rank("", vec![], 10).unwrap().is_empty());
        assert!(rank("rust", vec![], 1).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_limits_rejected() {
        assert_eq!(rank("", vec![], 0).unwrap_err(), RankError::InvalidLimit(0));
        assert_eq!(rank("rust", vec![], 51).unwrap_err(), RankError::InvalidLimit(51));
        assert!(rank("", vec![], 50).is_ok());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-7)), 1);
        assert_eq!(clamp_limit(Some(500)), 50);
        assert_eq!(clamp_limit(Some(12)), 12);
    }

    #[test]
    fn test_candidate_from_ats_analysis_defaults() {
        let data = json!({
            "overallScore": 82,
            "candidateDetails": {
                "name": "",
                "skills": ["Rust", 7, "SQL"],
                "workExperience": ["Acme 2019-2024"]
            }
        });
        let c = Candidate::from_ats_analysis(CandidateSource {
            analysis_id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            data: &data,
            analyzed_at: Utc::now(),
            resume_name: "cv.pdf",
            resume_text: Some("text"),
        })
        .unwrap();
        assert_eq!(c.name, "Unknown");
        assert_eq!(c.email, "N/A");
        assert_eq!(c.score, 82.0);
        assert_eq!(c.skills, vec!["Rust", "SQL"]);
        assert_eq!(c.experience, vec!["Acme 2019-2024"]);
        assert!(c.education.is_empty());
    }

    #[test]
    fn test_candidate_requires_details() {
        let data = json!({ "overallScore": 50 });
        let c = Candidate::from_ats_analysis(CandidateSource {
            analysis_id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            data: &data,
            analyzed_at: Utc::now(),
            resume_name: "cv.pdf",
            resume_text: None,
        });
        assert!(c.is_none());
    }

    #[test]
    fn test_ranked_candidate_hides_resume_text() {
        let ranked = RankedCandidate {
            candidate: candidate("A", 1.0, Some("secret resume body")),
            match_score: Some(2),
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert!(json.get("resume_text").is_none());
        assert_eq!(json["match_score"], 2);
        assert_eq!(json["name"], "A");
    }
}
