use crate::dto::process_dto::{
    check_date_range, clean_name, to_skill_tags, CreateProcessPayload, UpdateProcessPayload,
};
use crate::error::{Error, Result};
use crate::models::process::{
    Process, ProcessAction, ProcessStatus, OPTIONAL_SKILL_LEVEL, REQUIRED_SKILL_LEVEL,
};
use crate::utils::html::clean_html_text;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const PROCESS_COLUMNS: &str = "id, name, area, position, status, modality, requested_by, created_by, start_date, end_date, required_skills, optional_skills, job_functions, job_requirements, candidate_count, created_at, updated_at";

/// Outcome of a header action.
#[derive(Debug)]
pub enum ActionOutcome {
    Updated(Process),
    /// Edit doesn't write anything; the caller opens the edit form.
    Unchanged(Process),
    Deleted(Uuid),
}

#[derive(Clone)]
pub struct ProcessService {
    pool: PgPool,
}

impl ProcessService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateProcessPayload) -> Result<Process> {
        let name = clean_name(&payload.name)?;
        check_date_range(payload.start_date, payload.end_date)?;

        let status = payload.status.unwrap_or(ProcessStatus::Activo);
        let created_by = payload
            .created_by
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "admin".to_string());
        let required = to_skill_tags(&payload.required_skills, REQUIRED_SKILL_LEVEL);
        let optional = to_skill_tags(&payload.optional_skills, OPTIONAL_SKILL_LEVEL);

        let query = format!(
            r#"
            INSERT INTO processes (
                name, area, position, status, modality, requested_by, created_by,
                start_date, end_date, required_skills, optional_skills,
                job_functions, job_requirements
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        );

        let process = sqlx::query_as::<_, Process>(&query)
            .bind(name)
            .bind(payload.area)
            .bind(payload.position)
            .bind(status.as_str())
            .bind(payload.modality.as_str())
            .bind(payload.requested_by)
            .bind(created_by)
            .bind(payload.start_date)
            .bind(payload.end_date)
            .bind(Json(required))
            .bind(Json(optional))
            .bind(payload.job_functions)
            .bind(payload.job_requirements)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(process_id = %process.id, name = %process.name, "Process created");
        Ok(process)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Process> {
        let query = format!("SELECT {} FROM processes WHERE id = $1", PROCESS_COLUMNS);
        sqlx::query_as::<_, Process>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Process {} not found", id)))
    }

    /// `None` and `"Todos"` both list every process.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<Process>> {
        let filter = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("Todos") => None,
            Some(s) => Some(s.parse::<ProcessStatus>().map_err(Error::BadRequest)?),
        };

        let processes = match filter {
            Some(status) => {
                let query = format!(
                    "SELECT {} FROM processes WHERE status = $1 ORDER BY created_at DESC",
                    PROCESS_COLUMNS
                );
                sqlx::query_as::<_, Process>(&query)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {} FROM processes ORDER BY created_at DESC",
                    PROCESS_COLUMNS
                );
                sqlx::query_as::<_, Process>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(processes)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateProcessPayload) -> Result<Process> {
        let name = payload.name.as_deref().map(clean_name).transpose()?;
        let current = self.get_by_id(id).await?;
        if current.is_finished() {
            return Err(Error::Conflict(
                "A finished process cannot be edited".to_string(),
            ));
        }
        check_date_range(
            payload.start_date.or(current.start_date),
            payload.end_date.or(current.end_date),
        )?;

        let required = payload
            .required_skills
            .as_deref()
            .map(|s| Json(to_skill_tags(s, REQUIRED_SKILL_LEVEL)));
        let optional = payload
            .optional_skills
            .as_deref()
            .map(|s| Json(to_skill_tags(s, OPTIONAL_SKILL_LEVEL)));

        let query = format!(
            r#"
            UPDATE processes
            SET
                name = COALESCE($2, name),
                area = COALESCE($3, area),
                position = COALESCE($4, position),
                required_skills = COALESCE($5, required_skills),
                optional_skills = COALESCE($6, optional_skills),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                modality = COALESCE($9, modality),
                requested_by = COALESCE($10, requested_by),
                job_functions = COALESCE($11, job_functions),
                job_requirements = COALESCE($12, job_requirements),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PROCESS_COLUMNS
        );

        let process = sqlx::query_as::<_, Process>(&query)
            .bind(id)
            .bind(name)
            .bind(payload.area)
            .bind(payload.position)
            .bind(required)
            .bind(optional)
            .bind(payload.start_date)
            .bind(payload.end_date)
            .bind(payload.modality.map(|m| m.as_str()))
            .bind(payload.requested_by)
            .bind(payload.job_functions)
            .bind(payload.job_requirements)
            .fetch_one(&self.pool)
            .await?;

        Ok(process)
    }

    /// Last write wins: no version check against concurrent sessions.
    pub async fn set_status(&self, id: Uuid, status: ProcessStatus) -> Result<Process> {
        let query = format!(
            "UPDATE processes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            PROCESS_COLUMNS
        );
        let process = sqlx::query_as::<_, Process>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Process {} not found", id)))?;

        tracing::info!(process_id = %id, status = %status, "Process status updated");
        Ok(process)
    }

    pub async fn apply_action(&self, id: Uuid, action: ProcessAction) -> Result<ActionOutcome> {
        let current = self.get_by_id(id).await?;
        let status = current.current_status();
        if !action.is_available(status) {
            return Err(Error::Conflict(format!(
                "Action '{}' is not available for a process in status {}",
                action.label(),
                status
            )));
        }

        match action {
            ProcessAction::Delete => {
                self.delete(id).await?;
                Ok(ActionOutcome::Deleted(id))
            }
            ProcessAction::Edit => Ok(ActionOutcome::Unchanged(current)),
            ProcessAction::Pause | ProcessAction::Finish | ProcessAction::Reactivate => {
                let target = action
                    .target_status()
                    .ok_or_else(|| Error::Internal("Action has no target status".into()))?;
                Ok(ActionOutcome::Updated(self.set_status(id, target).await?))
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM processes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Process {} not found", id)));
        }
        tracing::info!(process_id = %id, "Process deleted");
        Ok(())
    }

    /// Mirrors the number of candidate rows onto the process.
    pub async fn refresh_candidate_count(&self, id: Uuid) -> Result<i32> {
        refresh_candidate_count(&self.pool, id).await
    }

    pub async fn job_description(&self, id: Uuid) -> Result<(String, String)> {
        let process = self.get_by_id(id).await?;
        let functions = clean_html_text(process.job_functions.as_deref().unwrap_or_default());
        let requirements =
            clean_html_text(process.job_requirements.as_deref().unwrap_or_default());
        Ok((functions, requirements))
    }
}

pub(crate) async fn refresh_candidate_count<'e, E>(executor: E, id: Uuid) -> Result<i32>
where
    E: PgExecutor<'e>,
{
    let count = sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE processes
        SET candidate_count = (SELECT COUNT(*)::int FROM candidates WHERE process_id = $1)
        WHERE id = $1
        RETURNING candidate_count
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .unwrap_or(0);
    Ok(count)
}

pub fn compose_job_description(functions: &str, requirements: &str) -> String {
    format!(
        "Job functions:\n{}\n\nQualifications and requirements:\n{}",
        functions, requirements
    )
}
