use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiMultipart, ApiPath, ApiQuery};
use super::pagination::{PageQuery, Paginated, PaginatedReports};
use crate::application::dto::filters::{ReportFilter, ReportOrdering};
use crate::application::errors::AppError;
use crate::application::use_cases::reports::create::{CreateReport, ReportUpload};
use crate::application::use_cases::reports::delete::DeleteReport;
use crate::application::use_cases::reports::download::DownloadReport;
use crate::application::use_cases::reports::get::GetReport;
use crate::application::use_cases::reports::list::ListReports;
use crate::application::use_cases::reports::update::{ReportPatch, UpdateReport};
use crate::bootstrap::app_context::AppContext;
use crate::domain::reports::report::{Report, first_of_month};

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub report_month: NaiveDate,
    pub resident: Uuid,
    pub resident_name: String,
    pub description: String,
    /// Download URL for the stored PDF.
    pub pdf: String,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(r: Report) -> Self {
        Self {
            pdf: format!("/api/reports/{}/pdf", r.id),
            id: r.id,
            report_month: r.report_month,
            resident: r.resident_id,
            resident_name: r.resident_name,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    pub resident: Option<Uuid>,
    /// Only the year and month are compared.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `report_month`, `-report_month`, `resident` or `-resident`.
    pub ordering: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateReportMultipart {
    #[schema(value_type = String, format = Uuid)]
    resident: String,
    /// Any day inside the month; stored as the first of the month.
    #[schema(value_type = String, format = Date)]
    report_month: String,
    description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pdf: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateReportMultipart {
    description: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pdf: Option<String>,
}

#[derive(Debug, Default)]
struct ReportForm {
    resident: Option<Uuid>,
    report_month: Option<NaiveDate>,
    description: Option<String>,
    pdf: Option<Vec<u8>>,
}

async fn read_form(mut multipart: Multipart) -> Result<ReportForm, AppError> {
    let mut form = ReportForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("resident") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                let id = Uuid::parse_str(t.trim())
                    .map_err(|_| AppError::validation("Invalid resident."))?;
                form.resident = Some(id);
            }
            Some("report_month") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                let month = NaiveDate::parse_from_str(t.trim(), "%Y-%m-%d")
                    .map_err(|_| AppError::validation("report_month must be a date (YYYY-MM-DD)."))?;
                form.report_month = Some(month);
            }
            Some("description") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                form.description = Some(t);
            }
            Some("pdf") => {
                let data = field.bytes().await.map_err(|e| AppError::validation(e.body_text()))?;
                form.pdf = Some(data.to_vec());
            }
            _ => {}
        }
    }
    Ok(form)
}

fn report_filter(q: ReportQuery) -> Result<ReportFilter, AppError> {
    let ordering = match q.ordering.as_deref().filter(|s| !s.trim().is_empty()) {
        None => ReportOrdering::default(),
        Some(raw) => ReportOrdering::parse(raw)
            .ok_or_else(|| AppError::validation(format!("Invalid ordering \"{raw}\".")))?,
    };
    Ok(ReportFilter {
        resident_id: q.resident,
        start_month: q.start_date.map(first_of_month),
        end_month: q.end_date.map(first_of_month),
        ordering,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/reports/", get(list_reports).post(create_report))
        .route(
            "/reports/:id/",
            get(get_report)
                .put(update_report)
                .patch(update_report)
                .delete(delete_report),
        )
        .route("/reports/:id/pdf", get(download_report))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/reports/", tag = "Reports", params(PageQuery, ReportQuery), responses(
    (status = 200, body = PaginatedReports),
    (status = 400, body = ErrorBody)
))]
pub async fn list_reports(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(q): ApiQuery<ReportQuery>,
) -> Result<Json<Paginated<ReportResponse>>, AppError> {
    let filter = report_filter(q)?;
    let repo = ctx.report_repo();
    let uc = ListReports {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&actor, &filter, page.request()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/reports/",
    tag = "Reports",
    request_body(content = CreateReportMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = ReportResponse),
        (status = 400, body = ErrorBody),
        (status = 409, body = ErrorBody)
    )
)]
pub async fn create_report(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    let form = read_form(multipart).await?;
    let resident_id = form
        .resident
        .ok_or_else(|| AppError::validation("resident is required."))?;
    let report_month = form
        .report_month
        .ok_or_else(|| AppError::validation("report_month is required."))?;
    let pdf = form
        .pdf
        .ok_or_else(|| AppError::validation("pdf file is required."))?;

    let reports = ctx.report_repo();
    let residents = ctx.resident_repo();
    let store = ctx.report_store();
    let uc = CreateReport {
        reports: reports.as_ref(),
        residents: residents.as_ref(),
        store: store.as_ref(),
        max_bytes: ctx.cfg.report_max_bytes,
    };
    let report = uc
        .execute(
            &actor,
            ReportUpload {
                resident_id,
                report_month,
                description: form.description.unwrap_or_default(),
                pdf,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

#[utoipa::path(get, path = "/api/reports/{id}/", tag = "Reports", params(("id" = Uuid, Path, description = "Report id")), responses(
    (status = 200, body = ReportResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_report(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let repo = ctx.report_repo();
    let uc = GetReport {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}/pdf",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "PDF bytes", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn download_report(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let repo = ctx.report_repo();
    let store = ctx.report_store();
    let uc = DownloadReport {
        repo: repo.as_ref(),
        store: store.as_ref(),
    };
    let (report, bytes) = uc.execute(&actor, id).await?;
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    let disposition = format!(
        "inline; filename=\"report-{}.pdf\"",
        report.report_month.format("%Y-%m")
    );
    if let Ok(v) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    Ok((headers, bytes).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/reports/{id}/",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body(content = UpdateReportMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = ReportResponse),
        (status = 400, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_report(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<ReportResponse>, AppError> {
    let form = read_form(multipart).await?;
    let reports = ctx.report_repo();
    let store = ctx.report_store();
    let uc = UpdateReport {
        reports: reports.as_ref(),
        store: store.as_ref(),
        max_bytes: ctx.cfg.report_max_bytes,
    };
    let patch = ReportPatch {
        description: form.description,
        pdf: form.pdf,
    };
    Ok(Json(uc.execute(&actor, id, patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/reports/{id}/", tag = "Reports", params(("id" = Uuid, Path, description = "Report id")), responses(
    (status = 204),
    (status = 403, body = ErrorBody),
    (status = 404, body = ErrorBody)
))]
pub async fn delete_report(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let reports = ctx.report_repo();
    let store = ctx.report_store();
    let uc = DeleteReport {
        reports: reports.as_ref(),
        store: store.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ordering_is_rejected() {
        let q = ReportQuery {
            ordering: Some("pdf".into()),
            ..Default::default()
        };
        assert!(matches!(report_filter(q), Err(AppError::Validation(_))));
    }

    #[test]
    fn ordering_defaults_to_month() {
        let filter = report_filter(ReportQuery::default()).unwrap();
        assert_eq!(filter.ordering, ReportOrdering::MonthAsc);
        let q = ReportQuery {
            ordering: Some("-resident".into()),
            ..Default::default()
        };
        assert_eq!(report_filter(q).unwrap().ordering, ReportOrdering::ResidentDesc);
    }
}
