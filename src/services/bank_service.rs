use crate::error::Result;
use crate::models::bank::Bank;
use sqlx::PgPool;

#[derive(Clone)]
pub struct BankService {
    pool: PgPool,
}

impl BankService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Bank>> {
        let banks = sqlx::query_as::<_, Bank>("SELECT id, name FROM banks ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Error fetching banks: {}", e);
                e
            })?;
        Ok(banks)
    }
}
