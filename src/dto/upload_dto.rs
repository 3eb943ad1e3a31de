use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub filename: String,
    pub size: usize,
    pub candidate_id: Uuid,
    pub statement_path: String,
    pub product: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub processed_files: Vec<ProcessedFile>,
}
