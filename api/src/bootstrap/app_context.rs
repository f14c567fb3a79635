use std::sync::Arc;

use crate::application::ports::carehome_manager_repository::CareHomeManagerRepository;
use crate::application::ports::carehome_repository::CareHomeRepository;
use crate::application::ports::feedback_repository::FeedbackRepository;
use crate::application::ports::health_check::HealthCheck;
use crate::application::ports::report_repository::ReportRepository;
use crate::application::ports::report_store::ReportFileStore;
use crate::application::ports::resident_repository::ResidentRepository;
use crate::application::ports::revoked_token_repository::RevokedTokenRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::ports::video_repository::VideoRepository;
use crate::application::ports::video_store::VideoFileStore;
use crate::application::services::tokens::TokenService;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    tokens: TokenService,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    carehome_repo: Arc<dyn CareHomeRepository>,
    carehome_manager_repo: Arc<dyn CareHomeManagerRepository>,
    resident_repo: Arc<dyn ResidentRepository>,
    feedback_repo: Arc<dyn FeedbackRepository>,
    report_repo: Arc<dyn ReportRepository>,
    report_store: Arc<dyn ReportFileStore>,
    session_repo: Arc<dyn SessionRepository>,
    video_repo: Arc<dyn VideoRepository>,
    video_store: Arc<dyn VideoFileStore>,
    revoked_tokens: Arc<dyn RevokedTokenRepository>,
    health_check: Arc<dyn HealthCheck>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        carehome_repo: Arc<dyn CareHomeRepository>,
        carehome_manager_repo: Arc<dyn CareHomeManagerRepository>,
        resident_repo: Arc<dyn ResidentRepository>,
        feedback_repo: Arc<dyn FeedbackRepository>,
        report_repo: Arc<dyn ReportRepository>,
        report_store: Arc<dyn ReportFileStore>,
        session_repo: Arc<dyn SessionRepository>,
        video_repo: Arc<dyn VideoRepository>,
        video_store: Arc<dyn VideoFileStore>,
        revoked_tokens: Arc<dyn RevokedTokenRepository>,
        health_check: Arc<dyn HealthCheck>,
    ) -> Self {
        Self {
            user_repo,
            carehome_repo,
            carehome_manager_repo,
            resident_repo,
            feedback_repo,
            report_repo,
            report_store,
            session_repo,
            video_repo,
            video_store,
            revoked_tokens,
            health_check,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        let tokens = TokenService::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_access_expires_secs,
            cfg.jwt_refresh_expires_secs,
        );
        Self {
            cfg,
            tokens,
            services: Arc::new(services),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn carehome_repo(&self) -> Arc<dyn CareHomeRepository> {
        self.services.carehome_repo.clone()
    }

    pub fn carehome_manager_repo(&self) -> Arc<dyn CareHomeManagerRepository> {
        self.services.carehome_manager_repo.clone()
    }

    pub fn resident_repo(&self) -> Arc<dyn ResidentRepository> {
        self.services.resident_repo.clone()
    }

    pub fn feedback_repo(&self) -> Arc<dyn FeedbackRepository> {
        self.services.feedback_repo.clone()
    }

    pub fn report_repo(&self) -> Arc<dyn ReportRepository> {
        self.services.report_repo.clone()
    }

    pub fn report_store(&self) -> Arc<dyn ReportFileStore> {
        self.services.report_store.clone()
    }

    pub fn session_repo(&self) -> Arc<dyn SessionRepository> {
        self.services.session_repo.clone()
    }

    pub fn video_repo(&self) -> Arc<dyn VideoRepository> {
        self.services.video_repo.clone()
    }

    pub fn video_store(&self) -> Arc<dyn VideoFileStore> {
        self.services.video_store.clone()
    }

    pub fn revoked_tokens(&self) -> Arc<dyn RevokedTokenRepository> {
        self.services.revoked_tokens.clone()
    }

    pub fn health_check(&self) -> Arc<dyn HealthCheck> {
        self.services.health_check.clone()
    }
}
