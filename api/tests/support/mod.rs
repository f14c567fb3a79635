//! In-memory ports and a router harness for the HTTP tests. Every `TestApp`
//! owns its own store, so tests never observe each other's data.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use virtuaid_api::application::access::Scope;
use virtuaid_api::application::dto::filters::{
    FeedbackFilter, FeedbackState, ReportFilter, ReportOrdering, ResidentFilter, SessionFilter,
    SessionOrderField, StatusCategory, UserFilter, VideoFilter, VideoOrderField,
};
use virtuaid_api::application::dto::pagination::{Page, PageRequest};
use virtuaid_api::application::errors::ConstraintViolation;
use virtuaid_api::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use virtuaid_api::application::ports::carehome_repository::{CareHomeRepository, NewCareHome};
use virtuaid_api::application::ports::feedback_repository::FeedbackRepository;
use virtuaid_api::application::ports::health_check::HealthCheck;
use virtuaid_api::application::ports::report_repository::{NewReport, ReportRepository};
use virtuaid_api::application::ports::report_store::ReportFileStore;
use virtuaid_api::application::ports::resident_repository::{NewResident, ResidentRepository};
use virtuaid_api::application::ports::revoked_token_repository::RevokedTokenRepository;
use virtuaid_api::application::ports::session_repository::{NewSession, SessionRepository};
use virtuaid_api::application::ports::user_repository::{NewUserRecord, UserRepository};
use virtuaid_api::application::ports::video_repository::{NewVideo, VideoRepository};
use virtuaid_api::application::ports::video_store::VideoFileStore;
use virtuaid_api::application::services::accounts::UserManager;
use virtuaid_api::application::services::tokens::TokenKind;
use virtuaid_api::bootstrap::app_context::{AppContext, AppServices};
use virtuaid_api::bootstrap::config::Config;
use virtuaid_api::domain::carehomes::carehome::{
    CareHome, CareHomeSummary, ManagerAssignment, ManagerSummary, generate_code,
};
use virtuaid_api::domain::feedbacks::feedback::Feedback;
use virtuaid_api::domain::reports::report::Report;
use virtuaid_api::domain::residents::resident::{CareHomeRef, Resident};
use virtuaid_api::domain::sessions::session::{SessionStatus, TherapySession};
use virtuaid_api::domain::users::user::User;
use virtuaid_api::domain::videos::video::Video;
use virtuaid_api::presentation::http::router;

pub const PASSWORD: &str = "s3cret-pass";
pub const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";
pub const CLIP: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom";

/// One file part of a multipart body.
pub struct Upload<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

#[derive(Debug, Clone)]
struct AssignmentRow {
    id: Uuid,
    manager_id: Uuid,
    carehome_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ResidentRow {
    id: Uuid,
    name: String,
    date_of_birth: NaiveDate,
    carehome_id: Uuid,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ReportRow {
    id: Uuid,
    report_month: NaiveDate,
    resident_id: Uuid,
    description: String,
    pdf_path: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SessionRow {
    id: Uuid,
    resident_id: Uuid,
    scheduled_date: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: SessionStatus,
    notes: Option<String>,
    feedback_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct VideoRow {
    id: Uuid,
    title: String,
    description: String,
    file_path: String,
    content_type: String,
    file_size: i64,
    resident_id: Option<Uuid>,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<(User, String)>,
    carehomes: Vec<CareHome>,
    assignments: Vec<AssignmentRow>,
    residents: Vec<ResidentRow>,
    feedbacks: Vec<Feedback>,
    reports: Vec<ReportRow>,
    sessions: Vec<SessionRow>,
    videos: Vec<VideoRow>,
    revoked: HashMap<Uuid, DateTime<Utc>>,
    files: HashMap<String, Vec<u8>>,
    /// Monotonic clock so creation order is stable.
    tick: i64,
}

fn still_referenced() -> anyhow::Error {
    anyhow::Error::new(ConstraintViolation::ForeignKey(
        "This record is still referenced by other records.".into(),
    ))
}

fn unique(msg: &str) -> anyhow::Error {
    anyhow::Error::new(ConstraintViolation::Unique(msg.into()))
}

impl State {
    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc::now() + Duration::microseconds(self.tick)
    }

    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.id == id)
    }

    fn carehome(&self, id: Uuid) -> Option<&CareHome> {
        self.carehomes.iter().find(|c| c.id == id)
    }

    fn carehome_visible(&self, scope: Scope, carehome_id: Uuid) -> bool {
        match scope {
            Scope::All => self.carehome(carehome_id).is_some(),
            Scope::Admin(id) => self
                .carehome(carehome_id)
                .is_some_and(|c| c.admin_id == Some(id)),
            Scope::Manager(id) => self
                .assignments
                .iter()
                .any(|a| a.manager_id == id && a.carehome_id == carehome_id),
        }
    }

    fn resident_row(&self, id: Uuid) -> Option<&ResidentRow> {
        self.residents.iter().find(|r| r.id == id)
    }

    fn resident_visible(&self, scope: Scope, resident_id: Uuid) -> bool {
        self.resident_row(resident_id)
            .is_some_and(|r| self.carehome_visible(scope, r.carehome_id))
    }

    fn resident(&self, row: &ResidentRow) -> Resident {
        let name = self
            .carehome(row.carehome_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Resident {
            id: row.id,
            name: row.name.clone(),
            date_of_birth: row.date_of_birth,
            carehome: CareHomeRef {
                id: row.carehome_id,
                name,
            },
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn assignment(&self, row: &AssignmentRow) -> Option<ManagerAssignment> {
        let manager = self.user(row.manager_id)?;
        let home = self.carehome(row.carehome_id)?;
        Some(ManagerAssignment {
            id: row.id,
            manager: ManagerSummary {
                id: manager.id,
                email: manager.email.clone(),
                name: manager.name.clone(),
            },
            carehome: CareHomeSummary {
                id: home.id,
                name: home.name.clone(),
                code: home.code.clone(),
                address: home.address.clone(),
            },
            created_at: row.created_at,
        })
    }

    fn report(&self, row: &ReportRow) -> Report {
        Report {
            id: row.id,
            report_month: row.report_month,
            resident_id: row.resident_id,
            resident_name: self
                .resident_row(row.resident_id)
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            description: row.description.clone(),
            pdf_path: row.pdf_path.clone(),
            created_at: row.created_at,
        }
    }

    fn video_visible(&self, scope: Scope, row: &VideoRow) -> bool {
        match row.resident_id {
            Some(id) => self.resident_visible(scope, id),
            None => matches!(scope, Scope::All),
        }
    }

    fn video(&self, row: &VideoRow) -> Video {
        Video {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            file_path: row.file_path.clone(),
            content_type: row.content_type.clone(),
            file_size: row.file_size,
            resident_id: row.resident_id,
            resident_name: row
                .resident_id
                .and_then(|id| self.resident_row(id))
                .map(|r| r.name.clone()),
            uploaded_at: row.uploaded_at,
            updated_at: row.updated_at,
        }
    }

    fn session(&self, row: &SessionRow) -> Option<TherapySession> {
        let resident = self.resident(self.resident_row(row.resident_id)?);
        Some(TherapySession {
            id: row.id,
            resident,
            scheduled_date: row.scheduled_date,
            end_time: row.end_time,
            status: row.status,
            notes: row.notes.clone(),
            feedback_id: row.feedback_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Every port backed by one mutex-guarded state.
pub struct MemoryStore {
    state: Mutex<State>,
    pub healthy: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            healthy: std::sync::atomic::AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    pub fn report_count(&self) -> usize {
        self.lock().reports.len()
    }

    pub fn video_count(&self) -> usize {
        self.lock().videos.len()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.lock().files.contains_key(path)
    }

    pub fn session_ids(&self) -> Vec<Uuid> {
        self.lock().sessions.iter().map(|s| s.id).collect()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, record: NewUserRecord) -> anyhow::Result<User> {
        let mut st = self.lock();
        if st.users.iter().any(|(u, _)| u.email == record.email) {
            return Err(unique("A user with this email already exists."));
        }
        let now = st.now();
        let user = User {
            id: Uuid::new_v4(),
            email: record.email,
            username: Some(record.username),
            name: record.name,
            avatar: record.avatar,
            role: record.role,
            created_by: record.created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        st.users.push((user.clone(), record.password_hash));
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .map(|(u, _)| u)
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<(User, String)>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| u.email == email)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .users
            .iter()
            .any(|(u, _)| u.username.as_deref() == Some(username)))
    }

    async fn list(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .map(|(u, _)| u)
            .filter(|u| filter.created_by.is_none() || u.created_by == filter.created_by)
            .filter(|u| filter.role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn update_profile(&self, user: &User) -> anyhow::Result<Option<User>> {
        let mut st = self.lock();
        if st
            .users
            .iter()
            .any(|(u, _)| u.id != user.id && u.email == user.email)
        {
            return Err(unique("A user with this email already exists."));
        }
        let now = st.now();
        let Some((stored, _)) = st.users.iter_mut().find(|(u, _)| u.id == user.id) else {
            return Ok(None);
        };
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.username = user.username.clone();
        stored.avatar = user.avatar.clone();
        stored.is_active = user.is_active;
        stored.updated_at = now;
        Ok(Some(stored.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.users.len();
        st.users.retain(|(u, _)| u.id != id);
        if st.users.len() == before {
            return Ok(false);
        }
        st.assignments.retain(|a| a.manager_id != id);
        for (u, _) in st.users.iter_mut() {
            if u.created_by == Some(id) {
                u.created_by = None;
            }
        }
        for c in st.carehomes.iter_mut() {
            if c.admin_id == Some(id) {
                c.admin_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl CareHomeRepository for MemoryStore {
    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<CareHome>> {
        let st = self.lock();
        let mut homes: Vec<CareHome> = st
            .carehomes
            .iter()
            .filter(|c| st.carehome_visible(scope, c.id))
            .cloned()
            .collect();
        homes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(homes)
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<CareHome>> {
        let st = self.lock();
        Ok(st
            .carehome(id)
            .filter(|c| st.carehome_visible(scope, c.id))
            .cloned())
    }

    async fn name_and_address_taken(
        &self,
        name: &str,
        address: &str,
        exclude: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .carehomes
            .iter()
            .any(|c| c.name == name && c.address == address && Some(c.id) != exclude))
    }

    async fn create(&self, home: NewCareHome) -> anyhow::Result<CareHome> {
        let mut st = self.lock();
        let now = st.now();
        let home = CareHome {
            id: Uuid::new_v4(),
            name: home.name,
            code: Some(home.code),
            admin_id: home.admin_id,
            address: home.address,
            created_at: now,
            updated_at: now,
        };
        st.carehomes.push(home.clone());
        Ok(home)
    }

    async fn update(&self, home: &CareHome) -> anyhow::Result<Option<CareHome>> {
        let mut st = self.lock();
        let now = st.now();
        let Some(stored) = st.carehomes.iter_mut().find(|c| c.id == home.id) else {
            return Ok(None);
        };
        stored.name = home.name.clone();
        stored.address = home.address.clone();
        stored.admin_id = home.admin_id;
        stored.updated_at = now;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        if st.residents.iter().any(|r| r.carehome_id == id)
            || st.assignments.iter().any(|a| a.carehome_id == id)
        {
            return Err(still_referenced());
        }
        let before = st.carehomes.len();
        st.carehomes.retain(|c| c.id != id);
        Ok(st.carehomes.len() != before)
    }

    async fn first_for_admin(&self, admin_id: Uuid) -> anyhow::Result<Option<CareHome>> {
        Ok(self
            .lock()
            .carehomes
            .iter()
            .filter(|c| c.admin_id == Some(admin_id))
            .min_by_key(|c| c.created_at)
            .cloned())
    }
}

#[async_trait]
impl CareHomeManagerRepository for MemoryStore {
    async fn count_for_carehome(&self, carehome_id: Uuid) -> anyhow::Result<i64> {
        Ok(self
            .lock()
            .assignments
            .iter()
            .filter(|a| a.carehome_id == carehome_id)
            .count() as i64)
    }

    async fn create(&self, carehome_id: Uuid, manager_id: Uuid) -> anyhow::Result<ManagerAssignment> {
        let mut st = self.lock();
        if st
            .assignments
            .iter()
            .any(|a| a.carehome_id == carehome_id && a.manager_id == manager_id)
        {
            return Err(unique("This manager is already assigned to this care home."));
        }
        let row = AssignmentRow {
            id: Uuid::new_v4(),
            manager_id,
            carehome_id,
            created_at: st.now(),
        };
        st.assignments.push(row.clone());
        st.assignment(&row)
            .ok_or_else(|| anyhow::anyhow!("assignment references missing rows"))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<ManagerAssignment>> {
        let st = self.lock();
        Ok(st
            .assignments
            .iter()
            .find(|a| a.id == id && st.carehome_visible(scope, a.carehome_id))
            .and_then(|a| st.assignment(a)))
    }

    async fn list(&self, scope: Scope) -> anyhow::Result<Vec<ManagerAssignment>> {
        let st = self.lock();
        Ok(st
            .assignments
            .iter()
            .filter(|a| st.carehome_visible(scope, a.carehome_id))
            .filter_map(|a| st.assignment(a))
            .collect())
    }

    async fn list_for_carehome(
        &self,
        scope: Scope,
        carehome_id: Uuid,
    ) -> anyhow::Result<Vec<ManagerAssignment>> {
        let st = self.lock();
        Ok(st
            .assignments
            .iter()
            .filter(|a| a.carehome_id == carehome_id && st.carehome_visible(scope, a.carehome_id))
            .filter_map(|a| st.assignment(a))
            .collect())
    }

    async fn list_unassigned_managers(&self, created_by: Uuid) -> anyhow::Result<Vec<User>> {
        let st = self.lock();
        Ok(st
            .users
            .iter()
            .map(|(u, _)| u)
            .filter(|u| u.is_manager() && u.created_by == Some(created_by))
            .filter(|u| !st.assignments.iter().any(|a| a.manager_id == u.id))
            .cloned()
            .collect())
    }

    async fn first_carehome_for_manager(&self, manager_id: Uuid) -> anyhow::Result<Option<CareHome>> {
        let st = self.lock();
        Ok(st
            .assignments
            .iter()
            .filter(|a| a.manager_id == manager_id)
            .min_by_key(|a| a.created_at)
            .and_then(|a| st.carehome(a.carehome_id).cloned()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.assignments.len();
        st.assignments.retain(|a| a.id != id);
        Ok(st.assignments.len() != before)
    }
}

#[async_trait]
impl ResidentRepository for MemoryStore {
    async fn list(
        &self,
        scope: Scope,
        filter: &ResidentFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Resident>> {
        let st = self.lock();
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<&ResidentRow> = st
            .residents
            .iter()
            .filter(|r| st.carehome_visible(scope, r.carehome_id))
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|n| r.name.to_lowercase().contains(n))
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let all = rows.into_iter().map(|r| st.resident(r)).collect();
        Ok(Page::from_vec(page, all))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Resident>> {
        let st = self.lock();
        Ok(st
            .resident_row(id)
            .filter(|r| st.carehome_visible(scope, r.carehome_id))
            .map(|r| st.resident(r)))
    }

    async fn create(&self, resident: NewResident) -> anyhow::Result<Resident> {
        let mut st = self.lock();
        let now = st.now();
        let row = ResidentRow {
            id: Uuid::new_v4(),
            name: resident.name,
            date_of_birth: resident.date_of_birth,
            carehome_id: resident.carehome_id,
            created_by: resident.created_by,
            created_at: now,
            updated_at: now,
        };
        st.residents.push(row.clone());
        Ok(st.resident(&row))
    }

    async fn update(&self, resident: &Resident) -> anyhow::Result<Option<Resident>> {
        let mut st = self.lock();
        let now = st.now();
        let Some(row) = st.residents.iter_mut().find(|r| r.id == resident.id) else {
            return Ok(None);
        };
        row.name = resident.name.clone();
        row.date_of_birth = resident.date_of_birth;
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(st.resident(&row)))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        if st.feedbacks.iter().any(|f| f.resident_id == id)
            || st.reports.iter().any(|r| r.resident_id == id)
            || st.videos.iter().any(|v| v.resident_id == Some(id))
        {
            return Err(still_referenced());
        }
        let before = st.residents.len();
        st.residents.retain(|r| r.id != id);
        st.sessions.retain(|s| s.resident_id != id);
        Ok(st.residents.len() != before)
    }
}

#[async_trait]
impl FeedbackRepository for MemoryStore {
    async fn list(
        &self,
        scope: Scope,
        filter: &FeedbackFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Feedback>> {
        let st = self.lock();
        let mut all: Vec<Feedback> = st
            .feedbacks
            .iter()
            .filter(|f| st.resident_visible(scope, f.resident_id))
            .filter(|f| filter.resident_id.is_none_or(|id| f.resident_id == id))
            .filter(|f| filter.start_date.is_none_or(|d| f.session_date >= d))
            .filter(|f| filter.end_date.is_none_or(|d| f.session_date <= d))
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            b.session_date
                .cmp(&a.session_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(Page::from_vec(page, all))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Feedback>> {
        let st = self.lock();
        Ok(st
            .feedbacks
            .iter()
            .find(|f| f.id == id && st.resident_visible(scope, f.resident_id))
            .cloned())
    }

    async fn create(&self, feedback: &Feedback) -> anyhow::Result<Feedback> {
        let mut st = self.lock();
        let stored = Feedback {
            id: Uuid::new_v4(),
            created_at: st.now(),
            ..feedback.clone()
        };
        st.feedbacks.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, feedback: &Feedback) -> anyhow::Result<Option<Feedback>> {
        let mut st = self.lock();
        let Some(stored) = st.feedbacks.iter_mut().find(|f| f.id == feedback.id) else {
            return Ok(None);
        };
        *stored = Feedback {
            created_at: stored.created_at,
            ..feedback.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.feedbacks.len();
        st.feedbacks.retain(|f| f.id != id);
        for s in st.sessions.iter_mut() {
            if s.feedback_id == Some(id) {
                s.feedback_id = None;
            }
        }
        Ok(st.feedbacks.len() != before)
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn list(
        &self,
        scope: Scope,
        filter: &ReportFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Report>> {
        let st = self.lock();
        let mut all: Vec<Report> = st
            .reports
            .iter()
            .filter(|r| st.resident_visible(scope, r.resident_id))
            .filter(|r| filter.resident_id.is_none_or(|id| r.resident_id == id))
            .filter(|r| filter.start_month.is_none_or(|m| r.report_month >= m))
            .filter(|r| filter.end_month.is_none_or(|m| r.report_month <= m))
            .map(|r| st.report(r))
            .collect();
        all.sort_by(|a, b| match filter.ordering {
            ReportOrdering::MonthAsc => a
                .report_month
                .cmp(&b.report_month)
                .then(a.resident_name.cmp(&b.resident_name)),
            ReportOrdering::MonthDesc => b
                .report_month
                .cmp(&a.report_month)
                .then(a.resident_name.cmp(&b.resident_name)),
            ReportOrdering::ResidentAsc => a
                .resident_name
                .cmp(&b.resident_name)
                .then(a.report_month.cmp(&b.report_month)),
            ReportOrdering::ResidentDesc => b
                .resident_name
                .cmp(&a.resident_name)
                .then(a.report_month.cmp(&b.report_month)),
        });
        Ok(Page::from_vec(page, all))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Report>> {
        let st = self.lock();
        Ok(st
            .reports
            .iter()
            .find(|r| r.id == id && st.resident_visible(scope, r.resident_id))
            .map(|r| st.report(r)))
    }

    async fn exists_for_month(&self, resident_id: Uuid, month: NaiveDate) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .reports
            .iter()
            .any(|r| r.resident_id == resident_id && r.report_month == month))
    }

    async fn create(&self, report: NewReport) -> anyhow::Result<Report> {
        let mut st = self.lock();
        if st
            .reports
            .iter()
            .any(|r| r.resident_id == report.resident_id && r.report_month == report.report_month)
        {
            return Err(unique("A report for this resident and month already exists."));
        }
        let row = ReportRow {
            id: report.id,
            report_month: report.report_month,
            resident_id: report.resident_id,
            description: report.description,
            pdf_path: report.pdf_path,
            created_at: st.now(),
        };
        st.reports.push(row.clone());
        Ok(st.report(&row))
    }

    async fn update(&self, report: &Report) -> anyhow::Result<Option<Report>> {
        let mut st = self.lock();
        let Some(row) = st.reports.iter_mut().find(|r| r.id == report.id) else {
            return Ok(None);
        };
        row.description = report.description.clone();
        row.pdf_path = report.pdf_path.clone();
        let row = row.clone();
        Ok(Some(st.report(&row)))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.reports.len();
        st.reports.retain(|r| r.id != id);
        Ok(st.reports.len() != before)
    }
}

fn category_matches(row: &SessionRow, category: StatusCategory, now: DateTime<Utc>) -> bool {
    match category {
        StatusCategory::Completed => row.status == SessionStatus::Completed,
        StatusCategory::Upcoming => row.status == SessionStatus::Scheduled && row.scheduled_date > now,
        StatusCategory::PastDue => row.status == SessionStatus::Scheduled && row.scheduled_date < now,
        StatusCategory::InProgress => row.status == SessionStatus::InProgress,
        StatusCategory::Today => row.scheduled_date.date_naive() == now.date_naive(),
    }
}

fn feedback_matches(row: &SessionRow, state: FeedbackState) -> bool {
    match state {
        FeedbackState::Completed => row.feedback_id.is_some(),
        FeedbackState::Pending => row.status == SessionStatus::Completed && row.feedback_id.is_none(),
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn list(
        &self,
        scope: Scope,
        filter: &SessionFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> anyhow::Result<Page<TherapySession>> {
        let st = self.lock();
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<&SessionRow> = st
            .sessions
            .iter()
            .filter(|s| st.resident_visible(scope, s.resident_id))
            .filter(|s| filter.status.is_none_or(|status| s.status == status))
            .filter(|s| filter.resident_id.is_none_or(|id| s.resident_id == id))
            .filter(|s| filter.category.is_none_or(|c| category_matches(s, c, now)))
            .filter(|s| filter.feedback.is_none_or(|f| feedback_matches(s, f)))
            .filter(|s| {
                needle.as_deref().is_none_or(|n| {
                    let resident = st
                        .resident_row(s.resident_id)
                        .map(|r| r.name.to_lowercase())
                        .unwrap_or_default();
                    let notes = s.notes.as_deref().unwrap_or_default().to_lowercase();
                    resident.contains(n) || notes.contains(n)
                })
            })
            .collect();
        let key = |s: &SessionRow| match filter.ordering.field {
            SessionOrderField::ScheduledDate => s.scheduled_date,
            SessionOrderField::CreatedAt => s.created_at,
            SessionOrderField::UpdatedAt => s.updated_at,
        };
        rows.sort_by(|a, b| {
            let ord = key(a).cmp(&key(b));
            let ord = if filter.ordering.descending { ord.reverse() } else { ord };
            ord.then(a.id.cmp(&b.id))
        });
        let all = rows.into_iter().filter_map(|s| st.session(s)).collect();
        Ok(Page::from_vec(page, all))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<TherapySession>> {
        let st = self.lock();
        Ok(st
            .sessions
            .iter()
            .find(|s| s.id == id && st.resident_visible(scope, s.resident_id))
            .and_then(|s| st.session(s)))
    }

    async fn create(&self, session: NewSession) -> anyhow::Result<TherapySession> {
        let mut st = self.lock();
        if let Some(fid) = session.feedback_id {
            if st.sessions.iter().any(|s| s.feedback_id == Some(fid)) {
                return Err(unique("This feedback is already linked to another session."));
            }
        }
        let now = st.now();
        let row = SessionRow {
            id: Uuid::new_v4(),
            resident_id: session.resident_id,
            scheduled_date: session.scheduled_date,
            end_time: session.end_time,
            status: session.status,
            notes: session.notes,
            feedback_id: session.feedback_id,
            created_at: now,
            updated_at: now,
        };
        st.sessions.push(row.clone());
        st.session(&row)
            .ok_or_else(|| anyhow::anyhow!("session references a missing resident"))
    }

    async fn update(&self, session: &TherapySession) -> anyhow::Result<Option<TherapySession>> {
        let mut st = self.lock();
        let now = st.now();
        let Some(row) = st.sessions.iter_mut().find(|s| s.id == session.id) else {
            return Ok(None);
        };
        row.resident_id = session.resident.id;
        row.scheduled_date = session.scheduled_date;
        row.end_time = session.end_time;
        row.status = session.status;
        row.notes = session.notes.clone();
        row.feedback_id = session.feedback_id;
        row.updated_at = now;
        let row = row.clone();
        Ok(st.session(&row))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.sessions.len();
        st.sessions.retain(|s| s.id != id);
        Ok(st.sessions.len() != before)
    }

    async fn feedback_linked_elsewhere(
        &self,
        feedback_id: Uuid,
        exclude_session: Option<Uuid>,
    ) -> anyhow::Result<bool> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .any(|s| s.feedback_id == Some(feedback_id) && Some(s.id) != exclude_session))
    }
}

#[async_trait]
impl RevokedTokenRepository for MemoryStore {
    async fn revoke(&self, jti: Uuid, expires_at: DateTime<Utc>) -> anyhow::Result<()> {
        self.lock().revoked.insert(jti, expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: Uuid) -> anyhow::Result<bool> {
        Ok(self.lock().revoked.contains_key(&jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let mut st = self.lock();
        let before = st.revoked.len();
        st.revoked.retain(|_, exp| *exp > now);
        Ok((before - st.revoked.len()) as u64)
    }
}

#[async_trait]
impl ReportFileStore for MemoryStore {
    async fn save(&self, report_id: Uuid, bytes: &[u8]) -> anyhow::Result<String> {
        let path = format!("reports/{report_id}.pdf");
        self.lock().files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn read(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing file {path}"))
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.lock().files.remove(path);
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn list(
        &self,
        scope: Scope,
        filter: &VideoFilter,
        page: PageRequest,
    ) -> anyhow::Result<Page<Video>> {
        let st = self.lock();
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut rows: Vec<&VideoRow> = st
            .videos
            .iter()
            .filter(|v| st.video_visible(scope, v))
            .filter(|v| {
                needle.as_deref().is_none_or(|n| {
                    v.title.to_lowercase().contains(n) || v.description.to_lowercase().contains(n)
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            let ord = match filter.ordering.field {
                VideoOrderField::UploadedAt => a.uploaded_at.cmp(&b.uploaded_at),
                VideoOrderField::Title => a.title.cmp(&b.title),
            };
            let ord = if filter.ordering.descending { ord.reverse() } else { ord };
            ord.then(a.id.cmp(&b.id))
        });
        let all = rows.into_iter().map(|v| st.video(v)).collect();
        Ok(Page::from_vec(page, all))
    }

    async fn get(&self, scope: Scope, id: Uuid) -> anyhow::Result<Option<Video>> {
        let st = self.lock();
        Ok(st
            .videos
            .iter()
            .find(|v| v.id == id && st.video_visible(scope, v))
            .map(|v| st.video(v)))
    }

    async fn create(&self, video: NewVideo) -> anyhow::Result<Video> {
        let mut st = self.lock();
        let now = st.now();
        let row = VideoRow {
            id: video.id,
            title: video.title,
            description: video.description,
            file_path: video.file_path,
            content_type: video.content_type,
            file_size: video.file_size,
            resident_id: video.resident_id,
            uploaded_at: now,
            updated_at: now,
        };
        st.videos.push(row.clone());
        Ok(st.video(&row))
    }

    async fn update(&self, video: &Video) -> anyhow::Result<Option<Video>> {
        let mut st = self.lock();
        let now = st.now();
        let Some(row) = st.videos.iter_mut().find(|v| v.id == video.id) else {
            return Ok(None);
        };
        row.title = video.title.clone();
        row.description = video.description.clone();
        row.file_path = video.file_path.clone();
        row.content_type = video.content_type.clone();
        row.file_size = video.file_size;
        row.resident_id = video.resident_id;
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(st.video(&row)))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.lock();
        let before = st.videos.len();
        st.videos.retain(|v| v.id != id);
        Ok(st.videos.len() != before)
    }
}

#[async_trait]
impl VideoFileStore for MemoryStore {
    async fn save_video(&self, video_id: Uuid, filename: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let path = format!("videos/{video_id}/{filename}");
        self.lock().files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn read_video(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing file {path}"))
    }

    async fn delete_video(&self, path: &str) -> anyhow::Result<()> {
        self.lock().files.remove(path);
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> bool {
        self.healthy.load(std::sync::atomic::Ordering::SeqCst)
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn detail(&self) -> &str {
        self.body["detail"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub ctx: AppContext,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let cfg = Config::from_lookup(|_| None).unwrap();
        let store = Arc::new(MemoryStore::new());
        let services = AppServices::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let ctx = AppContext::new(cfg, services);
        let router = router(ctx.clone());
        Self { store, ctx, router }
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call("POST", uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call("PATCH", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.call("DELETE", uri, Some(token), None).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        text_fields: &[(&str, &str)],
        pdf: Option<&[u8]>,
    ) -> TestResponse {
        let file = pdf.map(|bytes| Upload {
            field: "pdf",
            filename: "report.pdf",
            content_type: "application/pdf",
            bytes,
        });
        self.upload(method, uri, token, text_fields, file).await
    }

    pub async fn upload(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        text_fields: &[(&str, &str)],
        file: Option<Upload<'_>>,
    ) -> TestResponse {
        let boundary = "virtuaid-test-boundary";
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in text_fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    file.field, file.filename, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    pub fn token_for(&self, user: &User) -> String {
        self.ctx.tokens().issue(user.id, TokenKind::Access).unwrap().0
    }

    pub async fn superadmin(&self, email: &str) -> User {
        let manager = UserManager {
            repo: self.store.as_ref(),
        };
        manager
            .create_superadmin(email, "Root Admin", PASSWORD, None, None)
            .await
            .unwrap()
    }

    pub async fn admin(&self, email: &str, created_by: Option<Uuid>) -> User {
        let manager = UserManager {
            repo: self.store.as_ref(),
        };
        manager
            .create_admin(email, "Home Admin", Some(PASSWORD), created_by, None, None)
            .await
            .unwrap()
    }

    pub async fn manager(&self, email: &str, created_by: Option<Uuid>) -> User {
        let manager = UserManager {
            repo: self.store.as_ref(),
        };
        manager
            .create_manager(email, "Floor Manager", Some(PASSWORD), created_by, None, None)
            .await
            .unwrap()
    }

    pub async fn carehome(&self, name: &str, admin: Option<&User>) -> CareHome {
        CareHomeRepository::create(
            self.store.as_ref(),
            NewCareHome {
                name: name.into(),
                code: generate_code(name),
                address: format!("{name} Street 1"),
                admin_id: admin.map(|a| a.id),
            },
        )
        .await
        .unwrap()
    }

    pub async fn assign(&self, home: &CareHome, manager: &User) -> ManagerAssignment {
        CareHomeManagerRepository::create(self.store.as_ref(), home.id, manager.id)
            .await
            .unwrap()
    }

    pub async fn resident(&self, home: &CareHome, name: &str) -> Resident {
        ResidentRepository::create(
            self.store.as_ref(),
            NewResident {
                name: name.into(),
                date_of_birth: NaiveDate::from_ymd_opt(1940, 3, 12).unwrap(),
                carehome_id: home.id,
                created_by: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn feedback(&self, resident: &Resident, session_date: NaiveDate) -> Feedback {
        FeedbackRepository::create(
            self.store.as_ref(),
            &Feedback {
                id: Uuid::nil(),
                resident_id: resident.id,
                created_at: Utc::now(),
                session_date,
                session_duration: 30,
                vr_experience: "Forest walk".into(),
                engagement_level: 4,
                satisfaction: 4,
                physical_impact: 3,
                cognitive_impact: 4,
                emotional_response: "Relaxed".into(),
                feedback_notes: String::new(),
            },
        )
        .await
        .unwrap()
    }

    pub async fn session(
        &self,
        resident: &Resident,
        scheduled_date: DateTime<Utc>,
        status: SessionStatus,
    ) -> TherapySession {
        SessionRepository::create(
            self.store.as_ref(),
            NewSession {
                resident_id: resident.id,
                scheduled_date,
                end_time: None,
                status,
                notes: None,
                feedback_id: None,
            },
        )
        .await
        .unwrap()
    }
}

/// A SuperAdmin, an Admin running one care home and a Manager assigned to it.
pub struct Fixture {
    pub app: TestApp,
    pub superadmin: User,
    pub admin: User,
    pub manager: User,
    pub home: CareHome,
}

impl Fixture {
    pub async fn new() -> Self {
        let app = TestApp::new();
        let superadmin = app.superadmin("root@virtuaid.test").await;
        let admin = app.admin("admin@virtuaid.test", Some(superadmin.id)).await;
        let manager = app.manager("manager@virtuaid.test", Some(admin.id)).await;
        let home = app.carehome("Sunrise Manor", Some(&admin)).await;
        app.assign(&home, &manager).await;
        Self {
            app,
            superadmin,
            admin,
            manager,
            home,
        }
    }

    pub fn root_token(&self) -> String {
        self.app.token_for(&self.superadmin)
    }

    pub fn admin_token(&self) -> String {
        self.app.token_for(&self.admin)
    }

    pub fn manager_token(&self) -> String {
        self.app.token_for(&self.manager)
    }
}
