use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::CandidateRowResponse,
    dto::process_dto::{
        CreateProcessPayload, DeleteProcessResponse, JobDescriptionResponse, ProcessActionPayload,
        ProcessDetailResponse, ProcessListQuery, ProcessResponse, TotalsResponse,
        UpdateProcessPayload,
    },
    error::Result,
    services::process_service::{compose_job_description, ActionOutcome},
    AppState,
};

fn deleted_response(id: Uuid) -> DeleteProcessResponse {
    DeleteProcessResponse {
        id,
        deleted: true,
        redirect_to: "/".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/api/processes",
    params(
        ("status" = Option<String>, Query, description = "Activo, Pausado, Finalizado or Todos")
    ),
    responses(
        (status = 200, description = "List of processes", body = Json<Vec<ProcessResponse>>),
        (status = 400, description = "Unknown status filter")
    )
)]
#[axum::debug_handler]
pub async fn list_processes(
    State(state): State<AppState>,
    Query(query): Query<ProcessListQuery>,
) -> Result<impl IntoResponse> {
    let processes = state
        .process_service
        .list(query.status.as_deref())
        .await?;
    let items: Vec<ProcessResponse> = processes.into_iter().map(ProcessResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/processes",
    request_body = CreateProcessPayload,
    responses(
        (status = 201, description = "Process created", body = Json<ProcessResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_process(
    State(state): State<AppState>,
    Json(payload): Json<CreateProcessPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let process = state.process_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ProcessResponse::from(process))))
}

#[utoipa::path(
    get,
    path = "/api/processes/{id}",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    responses(
        (status = 200, description = "Process with candidates and totals", body = Json<ProcessDetailResponse>),
        (status = 404, description = "Process not found")
    )
)]
#[axum::debug_handler]
pub async fn get_process(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let process = state.process_service.get_by_id(id).await?;
    let candidates = state.candidate_service.list_by_process(id).await?;
    let totals = state.candidate_service.totals_for_process(id).await?;

    Ok(Json(ProcessDetailResponse {
        process: ProcessResponse::from(process),
        candidates: candidates
            .into_iter()
            .map(CandidateRowResponse::from)
            .collect(),
        totals: TotalsResponse::from(totals),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/processes/{id}",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    request_body = UpdateProcessPayload,
    responses(
        (status = 200, description = "Process updated", body = Json<ProcessResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Process not found"),
        (status = 409, description = "Process is finished")
    )
)]
#[axum::debug_handler]
pub async fn update_process(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProcessPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let process = state.process_service.update(id, payload).await?;
    Ok(Json(ProcessResponse::from(process)))
}

#[utoipa::path(
    delete,
    path = "/api/processes/{id}",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    responses(
        (status = 200, description = "Process deleted, client goes back to the list", body = Json<DeleteProcessResponse>),
        (status = 404, description = "Process not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_process(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.process_service.delete(id).await?;
    Ok(Json(deleted_response(id)))
}

#[utoipa::path(
    post,
    path = "/api/processes/{id}/actions",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    request_body = ProcessActionPayload,
    responses(
        (status = 200, description = "Action applied"),
        (status = 404, description = "Process not found"),
        (status = 409, description = "Action not available in the current status"),
        (status = 422, description = "Unknown action")
    )
)]
#[axum::debug_handler]
pub async fn apply_process_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProcessActionPayload>,
) -> Result<Response> {
    tracing::info!(process_id = %id, action = ?payload.action, "Process action requested");
    let outcome = state.process_service.apply_action(id, payload.action).await?;
    let response = match outcome {
        ActionOutcome::Updated(process) | ActionOutcome::Unchanged(process) => {
            Json(ProcessResponse::from(process)).into_response()
        }
        ActionOutcome::Deleted(id) => Json(deleted_response(id)).into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/processes/{id}/candidates",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    responses(
        (status = 200, description = "Candidates, most recently updated first", body = Json<Vec<CandidateRowResponse>>),
        (status = 404, description = "Process not found")
    )
)]
#[axum::debug_handler]
pub async fn list_process_candidates(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.process_service.get_by_id(id).await?;
    let candidates = state.candidate_service.list_by_process(id).await?;
    let rows: Vec<CandidateRowResponse> = candidates
        .into_iter()
        .map(CandidateRowResponse::from)
        .collect();
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/processes/{id}/totals",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    responses(
        (status = 200, description = "Aggregated product totals", body = Json<TotalsResponse>),
        (status = 404, description = "Process not found")
    )
)]
#[axum::debug_handler]
pub async fn get_process_totals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.process_service.get_by_id(id).await?;
    let totals = state.candidate_service.totals_for_process(id).await?;
    Ok(Json(TotalsResponse::from(totals)))
}

#[utoipa::path(
    get,
    path = "/api/processes/{id}/job-description",
    params(
        ("id" = Uuid, Path, description = "Process ID")
    ),
    responses(
        (status = 200, description = "Plain-text job description", body = Json<JobDescriptionResponse>),
        (status = 404, description = "Process not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (job_functions, job_requirements) = state.process_service.job_description(id).await?;
    let description = compose_job_description(&job_functions, &job_requirements);
    Ok(Json(JobDescriptionResponse {
        job_functions,
        job_requirements,
        description,
    }))
}
