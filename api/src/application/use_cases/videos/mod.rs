//! Any authenticated role may manage videos; visibility follows the
//! resident's care home through [`Actor::scope`](crate::application::access::Actor::scope).

pub mod create;
pub mod delete;
pub mod download;
pub mod get;
pub mod list;
pub mod update;

use uuid::Uuid;

use crate::application::access::Actor;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::resident_repository::ResidentRepository;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct VideoFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl VideoFile {
    pub(crate) fn content_type(&self) -> String {
        self.content_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("application/octet-stream")
            .to_string()
    }
}

/// A linked resident must be inside the actor's scope.
pub(crate) async fn ensure_resident_visible<P>(
    residents: &P,
    actor: &Actor,
    resident_id: Option<Uuid>,
) -> AppResult<()>
where
    P: ResidentRepository + ?Sized,
{
    let Some(id) = resident_id else {
        return Ok(());
    };
    match residents.get(actor.scope(), id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::validation("Invalid resident.")),
    }
}
