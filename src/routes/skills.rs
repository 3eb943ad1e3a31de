use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    dto::skill_dto::{CreateSkillPayload, CreateSkillResponse, SkillOption, SkillQuery},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/skills",
    params(
        ("search" = Option<String>, Query, description = "Search term, at least 2 characters")
    ),
    responses(
        (status = 200, description = "Skill options", body = Json<Vec<SkillOption>>)
    )
)]
#[axum::debug_handler]
pub async fn list_skills(
    State(state): State<AppState>,
    Query(query): Query<SkillQuery>,
) -> Result<impl IntoResponse> {
    let skills = match query.search.as_deref() {
        Some(term) => state.skill_service.search(term).await?,
        None => state.skill_service.list().await?,
    };
    let options: Vec<SkillOption> = skills.into_iter().map(SkillOption::from).collect();
    Ok(Json(options))
}

#[utoipa::path(
    post,
    path = "/api/skills",
    request_body = CreateSkillPayload,
    responses(
        (status = 201, description = "Skill created", body = Json<CreateSkillResponse>),
        (status = 200, description = "Skill already existed", body = Json<CreateSkillResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_skill(
    State(state): State<AppState>,
    Json(payload): Json<CreateSkillPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (skill, created) = state.skill_service.create_or_get(&payload.name).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CreateSkillResponse {
            skill: SkillOption::from(skill),
            created,
        }),
    ))
}
