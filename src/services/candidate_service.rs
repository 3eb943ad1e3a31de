use crate::dto::candidate_dto::UpdateCandidatePayload;
use crate::error::{Error, Result};
use crate::models::candidate::{normalize_linkedin_url, Candidate, CandidateStatus, CandidateSummary};
use crate::models::product::ProductTotals;
use crate::services::process_service::{refresh_candidate_count, ProcessService};
use crate::utils::validation::validate_phone_number;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const CANDIDATE_COLUMNS: &str = "id, process_id, user_id, name, email, phone, linkedin_url, status, ai_score, match_feedback, interview_date, update_date, statement_path, product, created_at";

#[derive(Debug, Clone, Default)]
pub struct NewCandidate {
    pub process_id: Uuid,
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub ai_score: i32,
    pub match_feedback: Option<String>,
    pub statement_path: Option<String>,
    pub product: Option<String>,
}

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
    processes: ProcessService,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        let processes = ProcessService::new(pool.clone());
        Self { pool, processes }
    }

    pub async fn get(&self, id: Uuid) -> Result<Candidate> {
        let query = format!("SELECT {} FROM candidates WHERE id = $1", CANDIDATE_COLUMNS);
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))
    }

    pub async fn list_by_process(&self, process_id: Uuid) -> Result<Vec<CandidateSummary>> {
        let candidates = sqlx::query_as::<_, CandidateSummary>(
            r#"
            SELECT id, name, update_date, interview_date, ai_score, status, linkedin_url
            FROM candidates
            WHERE process_id = $1
            ORDER BY update_date DESC
            "#,
        )
        .bind(process_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    pub async fn create(&self, new: NewCandidate) -> Result<Candidate> {
        let candidate = insert_candidate(&self.pool, new).await?;
        self.processes
            .refresh_candidate_count(candidate.process_id)
            .await?;
        tracing::info!(candidate_id = %candidate.id, process_id = %candidate.process_id, "Candidate created");
        Ok(candidate)
    }

    /// Inserts every candidate of one upload in a single transaction; either
    /// all rows are stored or none.
    pub async fn create_batch(
        &self,
        process_id: Uuid,
        batch: Vec<NewCandidate>,
    ) -> Result<Vec<Candidate>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(batch.len());
        for new in batch {
            created.push(insert_candidate(&mut *tx, new).await?);
        }
        refresh_candidate_count(&mut *tx, process_id).await?;
        tx.commit().await?;

        tracing::info!(%process_id, count = created.len(), "Candidates created from upload");
        Ok(created)
    }

    pub async fn update_details(&self, id: Uuid, payload: UpdateCandidatePayload) -> Result<Candidate> {
        let contact = ContactChanges::from_payload(&payload)?;

        let query = format!(
            r#"
            UPDATE candidates
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                linkedin_url = COALESCE($5, linkedin_url),
                interview_date = COALESCE($6, interview_date),
                update_date = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .bind(contact.name)
            .bind(payload.email.map(|e| e.trim().to_string()))
            .bind(contact.phone)
            .bind(contact.linkedin_url)
            .bind(payload.interview_date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))?;

        tracing::info!(candidate_id = %id, "Candidate details updated");
        Ok(candidate)
    }

    /// Persists exactly the requested status. Values outside the allow-list and
    /// candidates of a finished process are rejected before any write.
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Candidate> {
        let status: CandidateStatus = status.parse().map_err(Error::BadRequest)?;

        let current = self.get(id).await?;
        let process = self.processes.get_by_id(current.process_id).await?;
        if process.is_finished() {
            return Err(Error::Conflict(
                "Candidates of a finished process cannot change status".to_string(),
            ));
        }

        let query = format!(
            "UPDATE candidates SET status = $2, update_date = NOW() WHERE id = $1 RETURNING {}",
            CANDIDATE_COLUMNS
        );
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))?;

        tracing::info!(candidate_id = %id, status = %status, "Candidate status updated");
        Ok(candidate)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let process_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM candidates WHERE id = $1 RETURNING process_id",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Candidate {} not found", id)))?;

        self.processes.refresh_candidate_count(process_id).await?;
        Ok(())
    }

    pub async fn totals_for_process(&self, process_id: Uuid) -> Result<ProductTotals> {
        let products = sqlx::query_scalar::<_, Option<String>>(
            "SELECT product FROM candidates WHERE process_id = $1 ORDER BY created_at ASC",
        )
        .bind(process_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductTotals::aggregate(products.iter().map(|p| p.as_deref())))
    }
}

async fn insert_candidate<'e, E>(executor: E, new: NewCandidate) -> Result<Candidate>
where
    E: PgExecutor<'e>,
{
    let phone = new.phone.as_deref().and_then(validate_phone_number);
    let linkedin_url = new.linkedin_url.as_deref().and_then(normalize_linkedin_url);
    let ai_score = new.ai_score.clamp(0, 100);

    let query = format!(
        r#"
        INSERT INTO candidates (
            process_id, user_id, name, email, phone, linkedin_url, status,
            ai_score, match_feedback, statement_path, product
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        RETURNING {}
        "#,
        CANDIDATE_COLUMNS
    );

    let candidate = sqlx::query_as::<_, Candidate>(&query)
        .bind(new.process_id)
        .bind(new.user_id)
        .bind(new.name)
        .bind(new.email)
        .bind(phone)
        .bind(linkedin_url)
        .bind(CandidateStatus::Postulado.as_str())
        .bind(ai_score)
        .bind(new.match_feedback)
        .bind(new.statement_path)
        .bind(new.product)
        .fetch_one(executor)
        .await?;
    Ok(candidate)
}

/// Cleaned contact fields of an edit. A value that was sent but cannot be
/// normalized is an error rather than a silent no-op.
#[derive(Debug, Default, PartialEq)]
struct ContactChanges {
    name: Option<String>,
    phone: Option<String>,
    linkedin_url: Option<String>,
}

impl ContactChanges {
    fn from_payload(payload: &UpdateCandidatePayload) -> Result<Self> {
        let name = match payload.name.as_deref().map(str::trim) {
            Some("") => return Err(Error::BadRequest("Candidate name must not be blank".into())),
            other => other.map(str::to_string),
        };
        let phone = match payload.phone.as_deref() {
            Some(raw) => Some(validate_phone_number(raw).ok_or_else(|| {
                Error::BadRequest(format!("Invalid phone number: {}", raw))
            })?),
            None => None,
        };
        let linkedin_url = match payload.linkedin_url.as_deref() {
            Some(raw) => Some(normalize_linkedin_url(raw).ok_or_else(|| {
                Error::BadRequest(format!("Invalid LinkedIn profile: {}", raw))
            })?),
            None => None,
        };
        Ok(Self {
            name,
            phone,
            linkedin_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_changes_are_normalized() {
        let payload = UpdateCandidatePayload {
            name: Some("  Ana Pérez ".into()),
            phone: Some("9 8765 4321".into()),
            linkedin_url: Some("@anaperez".into()),
            ..Default::default()
        };
        let changes = ContactChanges::from_payload(&payload).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Ana Pérez"));
        assert_eq!(changes.phone.as_deref(), Some("+56987654321"));
        assert_eq!(
            changes.linkedin_url.as_deref(),
            Some("https://www.linkedin.com/in/anaperez")
        );
    }

    #[test]
    fn unusable_contact_values_are_rejected() {
        let short_phone = UpdateCandidatePayload {
            phone: Some("1234".into()),
            ..Default::default()
        };
        assert!(matches!(
            ContactChanges::from_payload(&short_phone),
            Err(Error::BadRequest(_))
        ));

        let blank_name = UpdateCandidatePayload {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(ContactChanges::from_payload(&blank_name).is_err());

        assert_eq!(
            ContactChanges::from_payload(&UpdateCandidatePayload::default()).unwrap(),
            ContactChanges::default()
        );
    }
}
