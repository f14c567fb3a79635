use crate::application::services::accounts::UserError;
use crate::application::services::tokens::TokenError;

/// Failure of an application operation. The presentation layer maps each
/// variant onto an HTTP status.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found.")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }
}

/// Raised by repositories when the store rejects a write because of a
/// uniqueness or referential constraint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("{0}")]
    Unique(String),
    #[error("{0}")]
    ForeignKey(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ConstraintViolation>() {
            Some(cv) => AppError::Conflict(cv.to_string()),
            None => AppError::Internal(err),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail => AppError::Conflict(err.to_string()),
            UserError::Storage(e) => AppError::from(e),
            UserError::Hash => AppError::Internal(anyhow::anyhow!(err.to_string())),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Sign(e) => AppError::Internal(anyhow::Error::new(e)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}
