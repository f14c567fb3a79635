pub mod carehome_manager_repository_sqlx;
pub mod carehome_repository_sqlx;
pub mod feedback_repository_sqlx;
pub mod report_repository_sqlx;
pub mod resident_repository_sqlx;
pub mod revoked_token_repository_sqlx;
pub mod session_repository_sqlx;
pub mod user_repository_sqlx;
pub mod video_repository_sqlx;
