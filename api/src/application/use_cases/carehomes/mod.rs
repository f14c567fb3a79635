pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::carehomes::carehome::CAREHOME_NAME_MAX;

pub(crate) const DUPLICATE_CAREHOME: &str =
    "A care home with the same name and address already exists.";

fn validate_fields(name: &str, address: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Care home name is required."));
    }
    if name.trim().chars().count() > CAREHOME_NAME_MAX {
        return Err(AppError::validation(format!(
            "Care home name must be at most {CAREHOME_NAME_MAX} characters."
        )));
    }
    if address.trim().is_empty() {
        return Err(AppError::validation("Address is required."));
    }
    Ok(())
}

async fn ensure_unique<C: CareHomeRepository + ?Sized>(
    repo: &C,
    name: &str,
    address: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    if repo.name_and_address_taken(name, address, exclude).await? {
        return Err(AppError::validation(DUPLICATE_CAREHOME));
    }
    Ok(())
}

/// The administering account, when given, must hold the Admin role.
async fn ensure_admin<U: UserRepository + ?Sized>(users: &U, admin_id: Option<Uuid>) -> AppResult<()> {
    let Some(id) = admin_id else {
        return Ok(());
    };
    match users.find_by_id(id).await? {
        Some(user) if user.is_admin() => Ok(()),
        _ => Err(AppError::validation("Selected admin must be a user with the Admin role.")),
    }
}
