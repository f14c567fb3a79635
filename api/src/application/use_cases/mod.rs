pub mod auth;
pub mod carehome_managers;
pub mod carehomes;
pub mod feedbacks;
pub mod reports;
pub mod residents;
pub mod sessions;
pub mod users;
pub mod videos;
