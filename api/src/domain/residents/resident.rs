use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

pub const RESIDENT_NAME_MAX: usize = 125;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareHomeRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resident {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub carehome: CareHomeRef,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Resident name is required.".into());
    }
    if trimmed.chars().count() > RESIDENT_NAME_MAX {
        return Err(format!(
            "Resident name must be at most {RESIDENT_NAME_MAX} characters."
        ));
    }
    Ok(())
}

pub fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), String> {
    if dob >= today {
        return Err("Date of birth must be in the past.".into());
    }
    Ok(())
}
