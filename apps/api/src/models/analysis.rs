use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    #[serde(rename = "ats")]
    Ats,
    #[serde(rename = "job-match")]
    JobMatch,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Ats => "ats",
            AnalysisKind::JobMatch => "job-match",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ats" => Ok(AnalysisKind::Ats),
            "job-match" => Ok(AnalysisKind::JobMatch),
            other => Err(format!("unknown analysis kind '{other}'")),
        }
    }
}

/// A model analysis of one resume. `data` is the model's JSON, stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub kind: String,
    pub candidate_email: Option<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [AnalysisKind::Ats, AnalysisKind::JobMatch] {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&AnalysisKind::JobMatch).unwrap(), r#""job-match""#);
        let kind: AnalysisKind = serde_json::from_str(r#""ats""#).unwrap();
        assert_eq!(kind, AnalysisKind::Ats);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("roadmap".parse::<AnalysisKind>().is_err());
    }
}
