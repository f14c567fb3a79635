use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::residents::resident::Resident;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(SessionStatus::Scheduled),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("\"{other}\" is not a valid session status.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackStatus {
    Completed,
    Pending,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MarkInProgress,
    MarkCompleted,
    Cancel,
}

impl Transition {
    pub fn target(&self) -> SessionStatus {
        match self {
            Transition::MarkInProgress => SessionStatus::InProgress,
            Transition::MarkCompleted => SessionStatus::Completed,
            Transition::Cancel => SessionStatus::Cancelled,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Transition::MarkInProgress => "Session marked as in progress",
            Transition::MarkCompleted => "Session marked as completed",
            Transition::Cancel => "Session cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TherapySession {
    pub id: Uuid,
    pub resident: Resident,
    pub scheduled_date: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub feedback_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TherapySession {
    pub fn feedback_status(&self) -> FeedbackStatus {
        if self.feedback_id.is_some() {
            FeedbackStatus::Completed
        } else if self.status == SessionStatus::Completed {
            FeedbackStatus::Pending
        } else {
            FeedbackStatus::NotApplicable
        }
    }

    /// Any status may be moved by an action; completing stamps `end_time`.
    pub fn apply(&mut self, transition: Transition, now: DateTime<Utc>) {
        self.status = transition.target();
        if transition == Transition::MarkCompleted {
            self.end_time = Some(now);
        }
    }
}
