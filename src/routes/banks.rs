use axum::{extract::State, response::IntoResponse, Json};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/banks",
    responses(
        (status = 200, description = "Banks sorted by name")
    )
)]
#[axum::debug_handler]
pub async fn list_banks(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let banks = state.bank_service.list().await?;
    Ok(Json(banks))
}
