pub mod auth;
pub mod carehome_managers;
pub mod carehomes;
pub mod error;
pub mod extract;
pub mod feedbacks;
pub mod health;
pub mod pagination;
pub mod reports;
pub mod residents;
pub mod sessions;
pub mod users;
pub mod videos;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;

/// Multipart framing on top of the uploaded file itself.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::obtain_token,
        auth::refresh_token,
        auth::verify_token,
        auth::logout,
        auth::current_user,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        carehomes::list_carehomes,
        carehomes::create_carehome,
        carehomes::get_carehome,
        carehomes::update_carehome,
        carehomes::delete_carehome,
        carehome_managers::list_assignments,
        carehome_managers::assign_manager,
        carehome_managers::get_assignment,
        carehome_managers::unassign_manager,
        residents::list_residents,
        residents::create_resident,
        residents::get_resident,
        residents::update_resident,
        residents::delete_resident,
        feedbacks::list_feedbacks,
        feedbacks::create_feedback,
        feedbacks::get_feedback,
        feedbacks::update_feedback,
        feedbacks::delete_feedback,
        reports::list_reports,
        reports::create_report,
        reports::get_report,
        reports::download_report,
        reports::update_report,
        reports::delete_report,
        sessions::list_sessions,
        sessions::create_session,
        sessions::get_session,
        sessions::update_session,
        sessions::delete_session,
        sessions::mark_completed,
        sessions::mark_in_progress,
        sessions::cancel_session,
        videos::list_videos,
        videos::create_video,
        videos::get_video,
        videos::download_video,
        videos::update_video,
        videos::delete_video,
        health::health,
    ),
    components(schemas(
        error::ErrorBody,
        auth::TokenRequest,
        auth::TokenResponse,
        auth::RefreshRequest,
        auth::AccessResponse,
        auth::VerifyRequest,
        auth::EmptyResponse,
        users::UserResponse,
        users::CreateUserRequest,
        users::UpdateUserRequest,
        carehomes::CareHomeResponse,
        carehomes::CreateCareHomeRequest,
        carehomes::UpdateCareHomeRequest,
        carehome_managers::ManagerDetails,
        carehome_managers::CareHomeDetails,
        carehome_managers::AssignmentResponse,
        carehome_managers::AssignmentListResponse,
        carehome_managers::AssignRequest,
        residents::CareHomeName,
        residents::ResidentResponse,
        residents::CreateResidentRequest,
        residents::UpdateResidentRequest,
        feedbacks::FeedbackResponse,
        feedbacks::CreateFeedbackRequest,
        feedbacks::UpdateFeedbackRequest,
        reports::ReportResponse,
        reports::CreateReportMultipart,
        reports::UpdateReportMultipart,
        sessions::SessionResponse,
        sessions::CreateSessionRequest,
        sessions::UpdateSessionRequest,
        sessions::TransitionResponse,
        videos::VideoResponse,
        videos::CreateVideoMultipart,
        videos::UpdateVideoMultipart,
        pagination::PaginatedResidents,
        pagination::PaginatedFeedbacks,
        pagination::PaginatedReports,
        pagination::PaginatedSessions,
        pagination::PaginatedVideos,
        health::HealthResp,
    )),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "Auth", description = "Token issue, refresh, verification and logout"),
        (name = "Users", description = "Admin and manager accounts"),
        (name = "CareHomes", description = "Care homes"),
        (name = "CareHomeManagers", description = "Manager assignments to care homes"),
        (name = "Residents", description = "Care home residents"),
        (name = "Feedbacks", description = "VR session feedback"),
        (name = "Reports", description = "Monthly resident PDF reports"),
        (name = "Sessions", description = "Therapy session scheduling"),
        (name = "Videos", description = "Uploaded resident videos"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Every HTTP route plus the Swagger UI. CORS and tracing are layered on by
/// the binary.
pub fn router(ctx: AppContext) -> Router {
    let body_limit = ctx.cfg.report_max_bytes + MULTIPART_SLACK_BYTES;
    Router::new()
        .nest("/api", health::routes(ctx.clone()))
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest("/api/auth", users::routes(ctx.clone()))
        .nest("/api", carehomes::routes(ctx.clone()))
        .nest("/api", carehome_managers::routes(ctx.clone()))
        .nest("/api", residents::routes(ctx.clone()))
        .nest("/api", feedbacks::routes(ctx.clone()))
        .nest("/api", reports::routes(ctx.clone()))
        .nest("/api", sessions::routes(ctx.clone()))
        .nest("/api", videos::routes(ctx))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(body_limit))
}
