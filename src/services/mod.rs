pub mod ai_service;
pub mod bank_service;
pub mod candidate_service;
pub mod process_service;
pub mod skill_service;
pub mod statement_service;
