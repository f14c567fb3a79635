pub mod carehome_manager_repository;
pub mod carehome_repository;
pub mod feedback_repository;
pub mod health_check;
pub mod report_repository;
pub mod report_store;
pub mod resident_repository;
pub mod revoked_token_repository;
pub mod session_repository;
pub mod user_repository;
pub mod video_repository;
pub mod video_store;
