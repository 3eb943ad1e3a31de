use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const REQUIRED_SKILL_LEVEL: i32 = 3;
pub const OPTIONAL_SKILL_LEVEL: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Process {
    pub id: Uuid,
    pub name: String,
    pub area: Option<String>,
    pub position: Option<String>,
    pub status: String,
    pub modality: String,
    pub requested_by: Option<String>,
    pub created_by: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub required_skills: Json<Vec<SkillTag>>,
    pub optional_skills: Json<Vec<SkillTag>>,
    pub job_functions: Option<String>,
    pub job_requirements: Option<String>,
    pub candidate_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Process {
    /// Unknown stored values are treated as active so the row stays editable.
    pub fn current_status(&self) -> ProcessStatus {
        self.status.parse().unwrap_or(ProcessStatus::Activo)
    }

    pub fn is_finished(&self) -> bool {
        self.current_status() == ProcessStatus::Finalizado
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTag {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub level: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProcessStatus {
    Activo,
    Pausado,
    Finalizado,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 3] = [
        ProcessStatus::Activo,
        ProcessStatus::Pausado,
        ProcessStatus::Finalizado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Activo => "Activo",
            ProcessStatus::Pausado => "Pausado",
            ProcessStatus::Finalizado => "Finalizado",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown process status: {}", s))
    }
}

impl TryFrom<String> for ProcessStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProcessStatus> for String {
    fn from(value: ProcessStatus) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Modality {
    #[default]
    Presencial,
    Remoto,
    #[serde(rename = "Híbrido")]
    Hibrido,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Presencial => "Presencial",
            Modality::Remoto => "Remoto",
            Modality::Hibrido => "Híbrido",
        }
    }
}

/// Actions offered on a process header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessAction {
    Edit,
    Pause,
    Finish,
    Reactivate,
    Delete,
}

impl ProcessAction {
    pub const ALL: [ProcessAction; 5] = [
        ProcessAction::Edit,
        ProcessAction::Pause,
        ProcessAction::Finish,
        ProcessAction::Reactivate,
        ProcessAction::Delete,
    ];

    /// Status persisted by the action. Edit and delete don't touch the status field.
    pub fn target_status(&self) -> Option<ProcessStatus> {
        match self {
            ProcessAction::Pause => Some(ProcessStatus::Pausado),
            ProcessAction::Finish => Some(ProcessStatus::Finalizado),
            ProcessAction::Reactivate => Some(ProcessStatus::Activo),
            ProcessAction::Edit | ProcessAction::Delete => None,
        }
    }

    pub fn is_available(&self, status: ProcessStatus) -> bool {
        let finished = status == ProcessStatus::Finalizado;
        match self {
            ProcessAction::Edit | ProcessAction::Pause | ProcessAction::Finish => !finished,
            ProcessAction::Reactivate => finished,
            ProcessAction::Delete => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessAction::Edit => "Editar",
            ProcessAction::Pause => "Pausar",
            ProcessAction::Finish => "Finalizar",
            ProcessAction::Reactivate => "Reactivar",
            ProcessAction::Delete => "Eliminar",
        }
    }
}

pub fn available_actions(status: ProcessStatus) -> Vec<ProcessAction> {
    ProcessAction::ALL
        .into_iter()
        .filter(|action| action.is_available(status))
        .collect()
}
