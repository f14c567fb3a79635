pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::application::access::{Actor, Scope};
use crate::domain::users::user::User;

/// SuperAdmins see every account; everyone else sees themselves and the
/// accounts they created.
pub(crate) fn is_visible(actor: &Actor, user: &User) -> bool {
    actor.scope() == Scope::All
        || user.id == actor.user_id
        || user.created_by == Some(actor.user_id)
}
