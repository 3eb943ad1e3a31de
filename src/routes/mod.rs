pub mod banks;
pub mod candidates;
pub mod health;
pub mod processes;
pub mod skills;
pub mod upload;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Every `/api` route, without layers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/processes",
            get(processes::list_processes).post(processes::create_process),
        )
        .route(
            "/api/processes/:id",
            get(processes::get_process)
                .patch(processes::update_process)
                .delete(processes::delete_process),
        )
        .route(
            "/api/processes/:id/actions",
            post(processes::apply_process_action),
        )
        .route(
            "/api/processes/:id/candidates",
            get(processes::list_process_candidates),
        )
        .route(
            "/api/processes/:id/totals",
            get(processes::get_process_totals),
        )
        .route(
            "/api/processes/:id/job-description",
            get(processes::get_job_description),
        )
        .route(
            "/api/candidates/:id",
            get(candidates::get_candidate)
                .patch(candidates::update_candidate)
                .delete(candidates::delete_candidate),
        )
        .route(
            "/api/candidates/:id/status",
            post(candidates::update_candidate_status),
        )
        .route(
            "/api/candidate-statuses",
            get(candidates::list_candidate_statuses),
        )
        .route(
            "/api/skills",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route("/api/banks", get(banks::list_banks))
        .route("/api/upload", post(upload::upload_statements))
}
