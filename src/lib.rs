pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    ai_service::AIService,
    bank_service::BankService,
    candidate_service::CandidateService,
    process_service::ProcessService,
    skill_service::SkillService,
    statement_service::{DebugExtractor, StatementExtractor, StatementService},
};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub process_service: ProcessService,
    pub candidate_service: CandidateService,
    pub skill_service: SkillService,
    pub bank_service: BankService,
    pub ai_service: AIService,
    pub statement_service: StatementService,
}

impl AppState {
    pub fn new(pool: PgPool) -> error::Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let ai_service = AIService::new(config.openai_api_key.clone(), http_client);
        let extractor: Arc<dyn StatementExtractor> = if config.extract_debug {
            tracing::warn!("EXTRACT_DEBUG is on, statements get a fixed product");
            Arc::new(DebugExtractor)
        } else {
            Arc::new(ai_service.clone())
        };

        Ok(Self {
            process_service: ProcessService::new(pool.clone()),
            candidate_service: CandidateService::new(pool.clone()),
            skill_service: SkillService::new(pool.clone()),
            bank_service: BankService::new(pool.clone()),
            statement_service: StatementService::new(&config.uploads_dir, extractor),
            ai_service,
            pool,
        })
    }
}
