use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::skill::Skill;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SkillQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSkillPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// Select-box option.
#[derive(Debug, Clone, Serialize)]
pub struct SkillOption {
    pub value: uuid::Uuid,
    pub label: String,
}

impl From<Skill> for SkillOption {
    fn from(value: Skill) -> Self {
        Self {
            value: value.id,
            label: value.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSkillResponse {
    pub skill: SkillOption,
    pub created: bool,
}
