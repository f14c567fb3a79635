use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::MULTIPART_SLACK_BYTES;
use super::auth::CurrentUser;
use super::error::ErrorBody;
use super::extract::{ApiMultipart, ApiPath, ApiQuery};
use super::pagination::{PageQuery, Paginated, PaginatedVideos};
use crate::application::dto::filters::{VideoFilter, VideoOrdering};
use crate::application::errors::AppError;
use crate::application::use_cases::videos::VideoFile;
use crate::application::use_cases::videos::create::{CreateVideo, VideoUpload};
use crate::application::use_cases::videos::delete::DeleteVideo;
use crate::application::use_cases::videos::download::DownloadVideo;
use crate::application::use_cases::videos::get::GetVideo;
use crate::application::use_cases::videos::list::ListVideos;
use crate::application::use_cases::videos::update::{UpdateVideo, VideoPatch};
use crate::bootstrap::app_context::AppContext;
use crate::domain::videos::video::Video;

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Download URL for the stored file.
    pub file: String,
    pub file_size: i64,
    pub content_type: String,
    pub resident: Option<Uuid>,
    pub resident_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(v: Video) -> Self {
        Self {
            file: format!("/api/videos/{}/file", v.id),
            id: v.id,
            title: v.title,
            description: v.description,
            file_size: v.file_size,
            content_type: v.content_type,
            resident: v.resident_id,
            resident_name: v.resident_name,
            uploaded_at: v.uploaded_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VideoQuery {
    /// Case-insensitive match on title or description.
    pub search: Option<String>,
    /// `uploaded_at`, `-uploaded_at`, `title` or `-title`.
    pub ordering: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateVideoMultipart {
    title: String,
    description: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    resident: Option<String>,
    #[schema(value_type = String, format = Binary)]
    file: String,
}

/// An empty `resident` detaches the video.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateVideoMultipart {
    title: Option<String>,
    description: Option<String>,
    #[schema(value_type = Option<String>, format = Uuid)]
    resident: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    file: Option<String>,
}

#[derive(Debug, Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    resident: Option<Option<Uuid>>,
    file: Option<VideoFile>,
}

async fn read_form(mut multipart: Multipart) -> Result<VideoForm, AppError> {
    let mut form = VideoForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                form.title = Some(t);
            }
            Some("description") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                form.description = Some(t);
            }
            Some("resident") => {
                let t = field.text().await.map_err(|e| AppError::validation(e.body_text()))?;
                let t = t.trim();
                form.resident = Some(if t.is_empty() {
                    None
                } else {
                    Some(Uuid::parse_str(t).map_err(|_| AppError::validation("Invalid resident."))?)
                });
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| AppError::validation(e.body_text()))?;
                form.file = Some(VideoFile {
                    filename,
                    content_type,
                    bytes: data.to_vec(),
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn video_filter(q: VideoQuery) -> Result<VideoFilter, AppError> {
    let ordering = match q.ordering.as_deref().filter(|s| !s.trim().is_empty()) {
        None => VideoOrdering::default(),
        Some(raw) => VideoOrdering::parse(raw)
            .ok_or_else(|| AppError::validation(format!("Invalid ordering \"{raw}\".")))?,
    };
    Ok(VideoFilter {
        search: q.search.filter(|s| !s.trim().is_empty()),
        ordering,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    let body_limit = ctx.cfg.video_max_bytes + MULTIPART_SLACK_BYTES;
    Router::new()
        .route("/videos/", get(list_videos).post(create_video))
        .route(
            "/videos/:id/",
            get(get_video)
                .put(update_video)
                .patch(update_video)
                .delete(delete_video),
        )
        .route("/videos/:id/file", get(download_video))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/videos/", tag = "Videos", params(PageQuery, VideoQuery), responses(
    (status = 200, body = PaginatedVideos),
    (status = 400, body = ErrorBody)
))]
pub async fn list_videos(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(q): ApiQuery<VideoQuery>,
) -> Result<Json<Paginated<VideoResponse>>, AppError> {
    let filter = video_filter(q)?;
    let repo = ctx.video_repo();
    let uc = ListVideos {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&actor, &filter, page.request()).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/api/videos/",
    tag = "Videos",
    request_body(content = CreateVideoMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = VideoResponse),
        (status = 400, body = ErrorBody)
    )
)]
pub async fn create_video(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<(StatusCode, Json<VideoResponse>), AppError> {
    let form = read_form(multipart).await?;
    let title = form
        .title
        .ok_or_else(|| AppError::validation("title is required."))?;
    let file = form
        .file
        .ok_or_else(|| AppError::validation("file is required."))?;

    let videos = ctx.video_repo();
    let residents = ctx.resident_repo();
    let store = ctx.video_store();
    let uc = CreateVideo {
        videos: videos.as_ref(),
        residents: residents.as_ref(),
        store: store.as_ref(),
        max_bytes: ctx.cfg.video_max_bytes,
    };
    let video = uc
        .execute(
            &actor,
            VideoUpload {
                title,
                description: form.description.unwrap_or_default(),
                resident_id: form.resident.flatten(),
                file,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(video.into())))
}

#[utoipa::path(get, path = "/api/videos/{id}/", tag = "Videos", params(("id" = Uuid, Path, description = "Video id")), responses(
    (status = 200, body = VideoResponse),
    (status = 404, body = ErrorBody)
))]
pub async fn get_video(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<VideoResponse>, AppError> {
    let repo = ctx.video_repo();
    let uc = GetVideo {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&actor, id).await?.into()))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/file",
    tag = "Videos",
    params(("id" = Uuid, Path, description = "Video id")),
    responses(
        (status = 200, description = "Stored video bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn download_video(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Response, AppError> {
    let repo = ctx.video_repo();
    let store = ctx.video_store();
    let uc = DownloadVideo {
        repo: repo.as_ref(),
        store: store.as_ref(),
    };
    let (video, bytes) = uc.execute(&actor, id).await?;
    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&video.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);
    let disposition = format!("inline; filename=\"{}\"", video.file_name());
    if let Ok(v) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, v);
    }
    Ok((headers, bytes).into_response())
}

#[utoipa::path(
    patch,
    path = "/api/videos/{id}/",
    tag = "Videos",
    params(("id" = Uuid, Path, description = "Video id")),
    request_body(content = UpdateVideoMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = VideoResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_video(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiMultipart(multipart): ApiMultipart,
) -> Result<Json<VideoResponse>, AppError> {
    let form = read_form(multipart).await?;
    let videos = ctx.video_repo();
    let residents = ctx.resident_repo();
    let store = ctx.video_store();
    let uc = UpdateVideo {
        videos: videos.as_ref(),
        residents: residents.as_ref(),
        store: store.as_ref(),
        max_bytes: ctx.cfg.video_max_bytes,
    };
    let patch = VideoPatch {
        title: form.title,
        description: form.description,
        resident: form.resident,
        file: form.file,
    };
    Ok(Json(uc.execute(&actor, id, patch).await?.into()))
}

#[utoipa::path(delete, path = "/api/videos/{id}/", tag = "Videos", params(("id" = Uuid, Path, description = "Video id")), responses(
    (status = 204),
    (status = 404, body = ErrorBody)
))]
pub async fn delete_video(
    State(ctx): State<AppContext>,
    CurrentUser(actor): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let videos = ctx.video_repo();
    let store = ctx.video_store();
    let uc = DeleteVideo {
        videos: videos.as_ref(),
        store: store.as_ref(),
    };
    uc.execute(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
