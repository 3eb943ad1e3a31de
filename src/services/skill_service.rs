use crate::error::{Error, Result};
use crate::models::skill::Skill;
use sqlx::PgPool;

pub const MIN_SEARCH_CHARS: usize = 2;

#[derive(Clone)]
pub struct SkillService {
    pool: PgPool,
}

impl SkillService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT id, name, created_at FROM skills ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// Search-as-you-type; terms shorter than two characters return nothing.
    pub async fn search(&self, term: &str) -> Result<Vec<Skill>> {
        let term = term.trim();
        if !is_searchable(term) {
            return Ok(Vec::new());
        }
        let skills = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, created_at
            FROM skills
            WHERE name ILIKE $1
            ORDER BY name ASC
            LIMIT 50
            "#,
        )
        .bind(format!("%{}%", escape_like(term)))
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// Returns the existing skill with the same name (case-insensitive) or
    /// inserts a new one. The flag tells whether a row was created.
    pub async fn create_or_get(&self, name: &str) -> Result<(Skill, bool)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BadRequest("Skill name is required".into()));
        }

        let inserted = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name)
            VALUES ($1)
            ON CONFLICT ((LOWER(name))) DO NOTHING
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(skill) = inserted {
            tracing::info!(skill = %skill.name, "Skill created");
            return Ok((skill, true));
        }

        let existing = sqlx::query_as::<_, Skill>(
            "SELECT id, name, created_at FROM skills WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok((existing, false))
    }
}

pub fn is_searchable(term: &str) -> bool {
    term.trim().chars().count() >= MIN_SEARCH_CHARS
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
