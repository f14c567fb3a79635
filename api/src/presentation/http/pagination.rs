use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::feedbacks::FeedbackResponse;
use super::reports::ReportResponse;
use super::residents::ResidentResponse;
use super::sessions::SessionResponse;
use super::videos::VideoResponse;
use crate::application::dto::pagination::{Page, PageRequest};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Defaults to 20, capped at 100.
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// `next`/`previous` are page numbers, null at either end.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PaginatedResidents = Paginated<ResidentResponse>,
    PaginatedFeedbacks = Paginated<FeedbackResponse>,
    PaginatedReports = Paginated<ReportResponse>,
    PaginatedSessions = Paginated<SessionResponse>,
    PaginatedVideos = Paginated<VideoResponse>
)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T, U: From<T>> From<Page<T>> for Paginated<U> {
    fn from(page: Page<T>) -> Self {
        Self {
            count: page.count,
            next: page.next(),
            previous: page.previous(),
            results: page.results.into_iter().map(U::from).collect(),
        }
    }
}
