use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::candidate_dto::CandidateRowResponse;
use crate::models::process::{
    available_actions, Modality, Process, ProcessAction, ProcessStatus, SkillTag,
};
use crate::models::product::ProductTotals;
use crate::utils::format::{format_currency, format_long_date, ratio_percent};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSelection {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProcessPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub area: Option<String>,
    pub position: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<SkillSelection>,
    #[serde(default)]
    pub optional_skills: Vec<SkillSelection>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub modality: Modality,
    pub status: Option<ProcessStatus>,
    pub requested_by: Option<String>,
    pub created_by: Option<String>,
    pub job_functions: Option<String>,
    pub job_requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProcessPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub area: Option<String>,
    pub position: Option<String>,
    pub required_skills: Option<Vec<SkillSelection>>,
    pub optional_skills: Option<Vec<SkillSelection>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub modality: Option<Modality>,
    pub requested_by: Option<String>,
    pub job_functions: Option<String>,
    pub job_requirements: Option<String>,
}

pub fn to_skill_tags(selections: &[SkillSelection], level: i32) -> Vec<SkillTag> {
    selections
        .iter()
        .map(|s| SkillTag {
            value: s.value.clone(),
            label: s.label.clone(),
            level,
        })
        .collect()
}

/// Trimmed process name; blank names are rejected.
pub fn clean_name(name: &str) -> crate::error::Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::BadRequest(
            "Process name must not be blank".into(),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn check_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> crate::error::Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(crate::error::Error::BadRequest(
                "end_date must not be before start_date".into(),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProcessListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessActionPayload {
    pub action: ProcessAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionOption {
    pub action: ProcessAction,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub area: Option<String>,
    pub position: Option<String>,
    pub status: String,
    pub modality: String,
    pub requested_by: Option<String>,
    pub created_by: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_date_display: String,
    pub end_date_display: String,
    pub required_skills: Vec<SkillTag>,
    pub optional_skills: Vec<SkillTag>,
    pub job_functions: Option<String>,
    pub job_requirements: Option<String>,
    pub candidate_count: i32,
    pub actions: Vec<ActionOption>,
    pub accepts_uploads: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Process> for ProcessResponse {
    fn from(value: Process) -> Self {
        let status = value.current_status();
        let actions = available_actions(status)
            .into_iter()
            .map(|action| ActionOption {
                action,
                label: action.label(),
            })
            .collect();

        Self {
            id: value.id,
            name: value.name,
            area: value.area,
            position: value.position,
            start_date_display: format_long_date(value.start_date),
            end_date_display: format_long_date(value.end_date),
            status: value.status,
            modality: value.modality,
            requested_by: value.requested_by,
            created_by: value.created_by,
            start_date: value.start_date,
            end_date: value.end_date,
            required_skills: value.required_skills.0,
            optional_skills: value.optional_skills.0,
            job_functions: value.job_functions,
            job_requirements: value.job_requirements,
            candidate_count: value.candidate_count,
            actions,
            accepts_uploads: status != ProcessStatus::Finalizado,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsDisplay {
    pub cupo_total: String,
    pub cupo_utilizado: String,
    pub cupo_disponible: String,
    pub monto_total_facturado: String,
    pub monto_minimo_pagar: String,
    pub utilization: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsResponse {
    #[serde(flatten)]
    pub totals: ProductTotals,
    pub utilization_percent: f64,
    pub display: TotalsDisplay,
}

impl From<ProductTotals> for TotalsResponse {
    fn from(totals: ProductTotals) -> Self {
        let utilization_percent = totals.utilization_percent();
        let display = TotalsDisplay {
            cupo_total: format_currency(totals.cupo_total),
            cupo_utilizado: format_currency(totals.cupo_utilizado),
            cupo_disponible: format_currency(totals.cupo_disponible),
            monto_total_facturado: format_currency(totals.monto_total_facturado),
            monto_minimo_pagar: format_currency(totals.monto_minimo_pagar),
            utilization: ratio_percent(totals.cupo_utilizado, totals.cupo_total),
        };
        Self {
            totals,
            utilization_percent,
            display,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessDetailResponse {
    pub process: ProcessResponse,
    pub candidates: Vec<CandidateRowResponse>,
    pub totals: TotalsResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteProcessResponse {
    pub id: uuid::Uuid,
    pub deleted: bool,
    pub redirect_to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptionResponse {
    pub job_functions: String,
    pub job_requirements: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_credit_line_renders_zero_percent() {
        let response = TotalsResponse::from(ProductTotals {
            cupo_utilizado: 120.0,
            ..Default::default()
        });
        assert_eq!(response.display.utilization, "0%");
        assert_eq!(response.utilization_percent, 0.0);
        assert_eq!(response.display.cupo_total, "$0");
    }

    #[test]
    fn utilization_renders_as_rounded_share() {
        let response = TotalsResponse::from(ProductTotals {
            cupo_total: 300.0,
            cupo_utilizado: 100.0,
            ..Default::default()
        });
        assert_eq!(response.display.utilization, "33%");
    }

    #[test]
    fn skill_selections_carry_level() {
        let tags = to_skill_tags(
            &[SkillSelection {
                value: "1".into(),
                label: "Tarjetas".into(),
            }],
            3,
        );
        assert_eq!(tags[0].level, 3);
        assert_eq!(tags[0].label, "Tarjetas");
    }

    #[test]
    fn end_before_start_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1);
        let end = NaiveDate::from_ymd_opt(2024, 4, 1);
        assert!(check_date_range(start, end).is_err());
        assert!(check_date_range(start, None).is_ok());
        assert!(check_date_range(end, start).is_ok());
    }

    #[test]
    fn create_payload_defaults_modality() {
        let payload: CreateProcessPayload =
            serde_json::from_str(r#"{"name": "Cartolas marzo"}"#).unwrap();
        assert_eq!(payload.modality, Modality::Presencial);
        assert!(payload.required_skills.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn blank_names_are_rejected_after_trimming() {
        assert!(clean_name("   ").is_err());
        assert!(clean_name("").is_err());
        assert_eq!(clean_name("  Cartolas abril ").unwrap(), "Cartolas abril");
    }
}
