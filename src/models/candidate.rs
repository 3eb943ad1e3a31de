use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub process_id: Uuid,
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: String,
    pub ai_score: i32,
    pub match_feedback: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub update_date: DateTime<Utc>,
    pub statement_path: Option<String>,
    pub product: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row shape used by candidate tables.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub name: String,
    pub update_date: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub ai_score: i32,
    pub status: String,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CandidateStatus {
    Postulado,
    EnRevision,
    EntrevistaAgendada,
    Entrevistado,
    Aprobado,
    Rechazado,
    Contratado,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 7] = [
        CandidateStatus::Postulado,
        CandidateStatus::EnRevision,
        CandidateStatus::EntrevistaAgendada,
        CandidateStatus::Entrevistado,
        CandidateStatus::Aprobado,
        CandidateStatus::Rechazado,
        CandidateStatus::Contratado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Postulado => "Postulado",
            CandidateStatus::EnRevision => "En revisión",
            CandidateStatus::EntrevistaAgendada => "Entrevista agendada",
            CandidateStatus::Entrevistado => "Entrevistado",
            CandidateStatus::Aprobado => "Aprobado",
            CandidateStatus::Rechazado => "Rechazado",
            CandidateStatus::Contratado => "Contratado",
        }
    }

    pub fn allowed_values() -> Vec<&'static str> {
        Self::ALL.iter().map(CandidateStatus::as_str).collect()
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid candidate status '{}'. Allowed: {}",
                    s,
                    CandidateStatus::allowed_values().join(", ")
                )
            })
    }
}

impl TryFrom<String> for CandidateStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CandidateStatus> for String {
    fn from(value: CandidateStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Success,
    Warning,
    Primary,
}

impl ScoreBand {
    pub fn for_score(score: i32) -> Self {
        if score >= 80 {
            ScoreBand::Success
        } else if score >= 60 {
            ScoreBand::Warning
        } else {
            ScoreBand::Primary
        }
    }
}

/// Turns a bare handle into a profile URL. Returns `None` for blank input and
/// the "No encontrado" placeholder.
pub fn normalize_linkedin_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("No encontrado") {
        return None;
    }
    if trimmed.starts_with("http") {
        return url::Url::parse(trimmed).ok().map(String::from);
    }
    let without_host = trimmed
        .trim_start_matches("www.")
        .strip_prefix("linkedin.com/")
        .map(|rest| rest.strip_prefix("in/").unwrap_or(rest))
        .unwrap_or(trimmed);
    let handle = without_host.trim_start_matches('@').trim_matches('/');
    url::Url::parse("https://www.linkedin.com/in/")
        .and_then(|base| base.join(handle))
        .ok()
        .map(String::from)
}
