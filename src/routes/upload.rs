use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde_json::Value as JsonValue;
use std::path::Path as StdPath;
use uuid::Uuid;

use crate::{
    dto::upload_dto::{ProcessedFile, UploadResponse},
    error::{Error, Result},
    services::{candidate_service::NewCandidate, statement_service::validate_pdf},
    AppState,
};

/// Form values the browser sends as the literal text "undefined" when unset.
fn required_field(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "undefined" && v != "null")
        .ok_or_else(|| Error::BadRequest(format!("Missing {}", name)))
}

fn file_stem(filename: &str) -> String {
    StdPath::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Sin nombre")
        .to_string()
}

#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "One candidate created per statement", body = Json<UploadResponse>),
        (status = 400, description = "Missing ids, no files or a file that is not a PDF"),
        (status = 404, description = "Process not found"),
        (status = 409, description = "Process is finished")
    )
)]
#[axum::debug_handler]
pub async fn upload_statements(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut process_id = None;
    let mut user_id = None;
    let mut files: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field: {}", e);
        Error::BadRequest(e.to_string())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "files" | "files[]" => {
                let filename = field.file_name().unwrap_or("statement.pdf").to_string();
                let data = field.bytes().await?;
                files.push((filename, data));
            }
            "process_id" => process_id = Some(field.text().await?),
            "user_id" => user_id = Some(field.text().await?),
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    let process_id = required_field(process_id, "process_id")?;
    let process_id = Uuid::parse_str(&process_id)
        .map_err(|_| Error::BadRequest(format!("Invalid process_id: {}", process_id)))?;
    let user_id = required_field(user_id, "user_id")?;

    if files.is_empty() {
        return Err(Error::BadRequest("No files uploaded".to_string()));
    }
    for (filename, data) in &files {
        validate_pdf(filename, data)?;
    }

    let process = state.process_service.get_by_id(process_id).await?;
    if process.is_finished() {
        return Err(Error::Conflict(
            "A finished process does not accept statements".to_string(),
        ));
    }

    tracing::info!(%process_id, files = files.len(), "Processing uploaded statements");

    let mut ingested_files = Vec::with_capacity(files.len());
    for (filename, data) in files {
        let ingested = state.statement_service.ingest(&filename, &data).await?;
        ingested_files.push((filename, data.len(), ingested));
    }

    let batch = ingested_files
        .iter()
        .map(|(filename, _, ingested)| NewCandidate {
            process_id,
            user_id: Some(user_id.clone()),
            name: ingested
                .holder_name()
                .map(str::to_string)
                .unwrap_or_else(|| file_stem(filename)),
            statement_path: Some(ingested.stored_path.to_string_lossy().to_string()),
            product: Some(JsonValue::Object(ingested.product.clone()).to_string()),
            ..Default::default()
        })
        .collect();
    let candidates = state
        .candidate_service
        .create_batch(process_id, batch)
        .await?;

    let processed_files = ingested_files
        .into_iter()
        .zip(candidates)
        .map(|((filename, size, ingested), candidate)| ProcessedFile {
            filename,
            size,
            candidate_id: candidate.id,
            statement_path: ingested.stored_path.to_string_lossy().to_string(),
            product: JsonValue::Object(ingested.product),
        })
        .collect();

    Ok(Json(UploadResponse { processed_files }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_ids_are_missing() {
        assert!(required_field(None, "process_id").is_err());
        assert!(required_field(Some("undefined".into()), "process_id").is_err());
        assert!(required_field(Some("  ".into()), "user_id").is_err());
        assert_eq!(required_field(Some(" 42 ".into()), "user_id").unwrap(), "42");
    }

    #[test]
    fn candidate_name_falls_back_to_file_stem() {
        assert_eq!(file_stem("cartola_marzo.pdf"), "cartola_marzo");
        assert_eq!(file_stem(".pdf"), ".pdf");
    }
}
