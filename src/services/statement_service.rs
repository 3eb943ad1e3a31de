use crate::error::{Error, Result};
use crate::models::product::{normalize_product, NOT_FOUND};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Turns statement text into a product record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    async fn extract_product(&self, text: &str) -> Result<Map<String, JsonValue>>;

    async fn extract_interest(&self, _text: &str) -> Result<Option<JsonValue>> {
        Ok(None)
    }
}

/// Fixed answer used when extraction runs in debug mode.
#[derive(Clone, Default)]
pub struct DebugExtractor;

#[async_trait]
impl StatementExtractor for DebugExtractor {
    async fn extract_product(&self, _text: &str) -> Result<Map<String, JsonValue>> {
        let mut fields = Map::new();
        fields.insert("nombre_titular".into(), "Cartola de Prueba".into());
        fields.insert("numero_tarjeta".into(), "XXXX-XXXX-XXXX-4687".into());
        fields.insert("cupo_total".into(), 1_000_000.into());
        fields.insert("cupo_utilizado".into(), 250_000.into());
        fields.insert("cupo_disponible".into(), 750_000.into());
        Ok(normalize_product(&fields))
    }
}

#[derive(Debug, Clone)]
pub struct IngestedStatement {
    pub stored_path: PathBuf,
    pub sha256: String,
    pub product: Map<String, JsonValue>,
}

impl IngestedStatement {
    /// Holder name when extraction found one.
    pub fn holder_name(&self) -> Option<&str> {
        self.product
            .get("nombre_titular")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case(NOT_FOUND))
    }
}

#[derive(Clone)]
pub struct StatementService {
    uploads_dir: PathBuf,
    extractor: Arc<dyn StatementExtractor>,
}

impl StatementService {
    pub fn new(uploads_dir: impl Into<PathBuf>, extractor: Arc<dyn StatementExtractor>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            extractor,
        }
    }

    pub async fn ingest(&self, filename: &str, data: &[u8]) -> Result<IngestedStatement> {
        validate_pdf(filename, data)?;

        let sha256 = hex::encode(Sha256::digest(data));
        let stored_path = self.store(&sha256, data).await?;

        let text = extract_text(&stored_path).await;
        tracing::info!(
            filename,
            sha256 = %sha256,
            text_len = text.len(),
            "Statement stored, extracting product"
        );

        let mut product = self.extractor.extract_product(&text).await.map_err(|e| {
            tracing::error!("Product extraction failed for {}: {}", filename, e);
            e
        })?;

        match self.extractor.extract_interest(&text).await {
            Ok(Some(interest)) => {
                product.insert("intereses".to_string(), interest);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Interest extraction failed for {}: {}", filename, e),
        }

        Ok(IngestedStatement {
            stored_path,
            sha256,
            product,
        })
    }

    async fn store(&self, sha256: &str, data: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.uploads_dir).await?;
        let path = self.uploads_dir.join(format!("{}.pdf", sha256));
        if fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Statement {} already stored", sha256);
            return Ok(path);
        }
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write statement file: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;
        Ok(path)
    }
}

pub fn validate_pdf(filename: &str, data: &[u8]) -> Result<()> {
    let is_pdf_name = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf_name {
        return Err(Error::BadRequest(format!(
            "El archivo {} no es un PDF.",
            filename
        )));
    }
    if data.is_empty() {
        return Err(Error::BadRequest(format!("El archivo {} está vacío.", filename)));
    }
    if !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    Ok(())
}

async fn extract_text(path: &Path) -> String {
    let output = tokio::process::Command::new("pdftotext")
        .arg("-layout")
        .arg(path)
        .arg("-")
        .output()
        .await;
    command_text(output, path)
}

fn command_text(output: std::io::Result<std::process::Output>, path: &Path) -> String {
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).to_string(),
        Ok(out) => {
            tracing::error!(
                status = %out.status,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "pdftotext failed on {}",
                path.display()
            );
            String::from_utf8_lossy(&out.stdout).to_string()
        }
        Err(e) => {
            tracing::error!("Failed to run pdftotext on {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FAKE_PDF: &[u8] = b"%PDF-1.4\n% statement\n";

    fn service_with(mock: MockStatementExtractor, dir: &Path) -> StatementService {
        StatementService::new(dir, Arc::new(mock))
    }

    #[test]
    fn rejects_non_pdf_names_and_content() {
        assert!(validate_pdf("cartola.csv", FAKE_PDF).is_err());
        assert!(validate_pdf("cartola.pdf", b"PK\x03\x04").is_err());
        assert!(validate_pdf("cartola.pdf", b"").is_err());
        assert!(validate_pdf("CARTOLA.PDF", FAKE_PDF).is_ok());
    }

    #[tokio::test]
    async fn ingest_stores_by_content_hash_and_merges_interest() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatementExtractor::new();
        mock.expect_extract_product().times(1).returning(|_| {
            let mut fields = Map::new();
            fields.insert("cupo_total".into(), json!(300));
            Ok(normalize_product(&fields))
        });
        mock.expect_extract_interest()
            .times(1)
            .returning(|_| Ok(Some(json!({"rotativo": 1200}))));

        let service = service_with(mock, dir.path());
        let ingested = service.ingest("marzo.pdf", FAKE_PDF).await.unwrap();

        let expected = hex::encode(Sha256::digest(FAKE_PDF));
        assert_eq!(ingested.sha256, expected);
        assert_eq!(ingested.stored_path, dir.path().join(format!("{}.pdf", expected)));
        assert!(ingested.stored_path.exists());
        assert_eq!(ingested.product["cupo_total"], json!(300));
        assert_eq!(ingested.product["intereses"]["rotativo"], json!(1200));
        assert_eq!(ingested.holder_name(), None);
    }

    #[tokio::test]
    async fn failed_interest_extraction_keeps_product() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatementExtractor::new();
        mock.expect_extract_product()
            .returning(|_| Ok(normalize_product(&Map::new())));
        mock.expect_extract_interest()
            .returning(|_| Err(Error::Internal("timeout".into())));

        let service = service_with(mock, dir.path());
        let ingested = service.ingest("abril.pdf", FAKE_PDF).await.unwrap();
        assert!(!ingested.product.contains_key("intereses"));
        assert_eq!(ingested.product["cupo_total"], json!(NOT_FOUND));
    }

    #[tokio::test]
    async fn product_extraction_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockStatementExtractor::new();
        mock.expect_extract_product()
            .returning(|_| Err(Error::Internal("bad answer".into())));
        mock.expect_extract_interest().times(0);

        let service = service_with(mock, dir.path());
        assert!(service.ingest("mayo.pdf", FAKE_PDF).await.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failed_pdftotext_run_yields_its_partial_output() {
        use std::os::unix::process::ExitStatusExt;

        let output = std::process::Output {
            status: std::process::ExitStatus::from_raw(1 << 8),
            stdout: Vec::new(),
            stderr: b"Syntax Error: Couldn't find trailer dictionary".to_vec(),
        };
        assert_eq!(command_text(Ok(output), Path::new("rota.pdf")), "");

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "pdftotext");
        assert_eq!(command_text(Err(missing), Path::new("rota.pdf")), "");
    }

    #[test]
    fn debug_extractor_names_the_holder() {
        let product = tokio_test::block_on(DebugExtractor.extract_product("")).unwrap();
        let ingested = IngestedStatement {
            stored_path: PathBuf::from("x.pdf"),
            sha256: String::new(),
            product,
        };
        assert_eq!(ingested.holder_name(), Some("Cartola de Prueba"));
        assert_eq!(ingested.product["cupo_utilizado"], json!(250_000));
    }
}
