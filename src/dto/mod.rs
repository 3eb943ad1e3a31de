pub mod candidate_dto;
pub mod process_dto;
pub mod skill_dto;
pub mod upload_dto;
