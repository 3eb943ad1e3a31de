use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::{Candidate, CandidateSummary, ScoreBand};
use crate::models::product::ParsedProduct;
use crate::utils::format::format_date_time;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCandidateStatusPayload {
    pub status: String,
}

/// Contact edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCandidatePayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRowResponse {
    pub id: Uuid,
    pub name: String,
    pub update_date: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub update_date_display: String,
    pub interview_date_display: String,
    pub ai_score: i32,
    pub score_band: ScoreBand,
    pub status: String,
    pub linkedin_url: Option<String>,
}

impl From<CandidateSummary> for CandidateRowResponse {
    fn from(value: CandidateSummary) -> Self {
        Self {
            id: value.id,
            name: value.name,
            update_date_display: format_date_time(Some(value.update_date)),
            interview_date_display: format_date_time(value.interview_date),
            update_date: value.update_date,
            interview_date: value.interview_date,
            score_band: ScoreBand::for_score(value.ai_score),
            ai_score: value.ai_score,
            status: value.status,
            linkedin_url: value.linkedin_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
    pub id: Uuid,
    pub process_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: String,
    pub ai_score: i32,
    pub score_band: ScoreBand,
    pub match_feedback: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub update_date: DateTime<Utc>,
    /// Parsed product; `null` when the stored text is missing or malformed.
    pub product: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateResponse {
    fn from(value: Candidate) -> Self {
        let product = match ParsedProduct::parse(value.product.as_deref()) {
            ParsedProduct::Valid(fields) => Some(JsonValue::Object(fields)),
            ParsedProduct::Malformed | ParsedProduct::Missing => None,
        };
        Self {
            id: value.id,
            process_id: value.process_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            linkedin_url: value.linkedin_url,
            status: value.status,
            score_band: ScoreBand::for_score(value.ai_score),
            ai_score: value.ai_score,
            match_feedback: value.match_feedback,
            interview_date: value.interview_date,
            update_date: value.update_date,
            product,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateStatusesResponse {
    pub statuses: Vec<&'static str>,
}
