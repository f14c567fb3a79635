use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const MAX_MANAGERS_PER_CAREHOME: i64 = 5;
pub const CAREHOME_NAME_MAX: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareHome {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub admin_id: Option<Uuid>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareHomeSummary {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// A manager's assignment to a care home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerAssignment {
    pub id: Uuid,
    pub manager: ManagerSummary,
    pub carehome: CareHomeSummary,
    pub created_at: DateTime<Utc>,
}

/// Short public code: first three characters of the name followed by three
/// hex digits taken from a fresh v4 UUID.
pub fn generate_code(name: &str) -> String {
    let prefix: String = name.chars().take(3).collect();
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(3).collect();
    format!("{prefix}{suffix}")
}
