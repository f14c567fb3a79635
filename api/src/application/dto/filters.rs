use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::sessions::session::SessionStatus;
use crate::domain::users::role::Role;

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Restrict to users created by this account.
    pub created_by: Option<Uuid>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct ResidentFilter {
    pub search: Option<String>,
}

/// `start_date`/`end_date` are inclusive bounds on `session_date`.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub resident_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportOrdering {
    #[default]
    MonthAsc,
    MonthDesc,
    ResidentAsc,
    ResidentDesc,
}

impl ReportOrdering {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "report_month" => Some(Self::MonthAsc),
            "-report_month" => Some(Self::MonthDesc),
            "resident" => Some(Self::ResidentAsc),
            "-resident" => Some(Self::ResidentDesc),
            _ => None,
        }
    }
}

/// Month bounds compare against `report_month`; the day part is ignored.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub resident_id: Option<Uuid>,
    pub start_month: Option<NaiveDate>,
    pub end_month: Option<NaiveDate>,
    pub ordering: ReportOrdering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Completed,
    Upcoming,
    PastDue,
    InProgress,
    Today,
}

impl StatusCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "completed" => Some(Self::Completed),
            "upcoming" => Some(Self::Upcoming),
            "past_due" => Some(Self::PastDue),
            "in_progress" => Some(Self::InProgress),
            "today" => Some(Self::Today),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    /// A feedback record is linked.
    Completed,
    /// Session completed but no feedback yet.
    Pending,
}

impl FeedbackState {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "completed" => Some(Self::Completed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrderField {
    ScheduledDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOrdering {
    pub field: SessionOrderField,
    pub descending: bool,
}

impl Default for SessionOrdering {
    fn default() -> Self {
        Self {
            field: SessionOrderField::ScheduledDate,
            descending: true,
        }
    }
}

impl SessionOrdering {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "scheduled_date" => SessionOrderField::ScheduledDate,
            "created_at" => SessionOrderField::CreatedAt,
            "updated_at" => SessionOrderField::UpdatedAt,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub resident_id: Option<Uuid>,
    pub category: Option<StatusCategory>,
    pub feedback: Option<FeedbackState>,
    /// Matches resident name or notes, case-insensitive.
    pub search: Option<String>,
    pub ordering: SessionOrdering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOrderField {
    UploadedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoOrdering {
    pub field: VideoOrderField,
    pub descending: bool,
}

impl Default for VideoOrdering {
    fn default() -> Self {
        Self {
            field: VideoOrderField::UploadedAt,
            descending: true,
        }
    }
}

impl VideoOrdering {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "uploaded_at" => VideoOrderField::UploadedAt,
            "title" => VideoOrderField::Title,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Matches title or description, case-insensitive.
    pub search: Option<String>,
    pub ordering: VideoOrdering,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_ordering() {
        let o = SessionOrdering::parse("-created_at").unwrap();
        assert_eq!(o.field, SessionOrderField::CreatedAt);
        assert!(o.descending);
        assert!(!SessionOrdering::parse("updated_at").unwrap().descending);
        assert!(SessionOrdering::parse("notes").is_none());
        assert!(SessionOrdering::default().descending);
    }

    #[test]
    fn parses_report_ordering() {
        assert_eq!(ReportOrdering::parse("-report_month"), Some(ReportOrdering::MonthDesc));
        assert_eq!(ReportOrdering::parse("resident"), Some(ReportOrdering::ResidentAsc));
        assert_eq!(ReportOrdering::parse("pdf"), None);
    }

    #[test]
    fn parses_video_ordering() {
        assert_eq!(VideoOrdering::parse("title").unwrap().field, VideoOrderField::Title);
        assert!(VideoOrdering::parse("-uploaded_at").unwrap().descending);
        assert!(VideoOrdering::parse("file_size").is_none());
        assert_eq!(VideoOrdering::default().field, VideoOrderField::UploadedAt);
    }
}
