use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::accounts::{normalize_email, verify_password};
use crate::application::services::tokens::{TokenPair, TokenService};
use crate::domain::users::user::User;

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";
const MANAGER_WITHOUT_CAREHOME: &str = "You are not associated with any care home as a manager.";

pub struct Login<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: CareHomeManagerRepository + ?Sized,
{
    pub users: &'a U,
    pub assignments: &'a M,
    pub tokens: &'a TokenService,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

impl<'a, U, M> Login<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: CareHomeManagerRepository + ?Sized,
{
    pub async fn execute(&self, req: &LoginRequest) -> AppResult<LoginOutcome> {
        let email = normalize_email(&req.email);
        let (user, hash) = match self.users.find_credentials(&email).await? {
            Some(found) => found,
            None => return Err(AppError::unauthorized(BAD_CREDENTIALS)),
        };
        if !user.is_active || !verify_password(&req.password, &hash) {
            return Err(AppError::unauthorized(BAD_CREDENTIALS));
        }
        if user.is_manager()
            && self
                .assignments
                .first_carehome_for_manager(user.id)
                .await?
                .is_none()
        {
            tracing::info!(user_id = %user.id, "login_rejected_unassigned_manager");
            return Err(AppError::unauthorized(MANAGER_WITHOUT_CAREHOME));
        }
        let tokens = self.tokens.issue_pair(user.id)?;
        tracing::info!(user_id = %user.id, role = %user.role, "login");
        Ok(LoginOutcome { user, tokens })
    }
}
