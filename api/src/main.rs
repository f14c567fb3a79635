use std::io::{self, BufRead};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::MatchedPath;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use virtuaid_api::application::services::accounts::UserManager;
use virtuaid_api::bootstrap::app_context::{AppContext, AppServices};
use virtuaid_api::bootstrap::config::Config;
use virtuaid_api::infrastructure::db::{self, PgHealthCheck, PgPool};
use virtuaid_api::infrastructure::db::repositories::{
    carehome_manager_repository_sqlx::SqlxCareHomeManagerRepository,
    carehome_repository_sqlx::SqlxCareHomeRepository,
    feedback_repository_sqlx::SqlxFeedbackRepository,
    report_repository_sqlx::SqlxReportRepository,
    resident_repository_sqlx::SqlxResidentRepository,
    revoked_token_repository_sqlx::SqlxRevokedTokenRepository,
    session_repository_sqlx::SqlxSessionRepository, user_repository_sqlx::SqlxUserRepository,
    video_repository_sqlx::SqlxVideoRepository,
};
use virtuaid_api::infrastructure::storage::fs_upload_store::FsUploadStore;
use virtuaid_api::presentation::http::router;

#[derive(Debug, Parser)]
#[command(name = "virtuaid-api", about = "VirtuAid care home backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP (default).
    Serve,
    /// Apply migrations and exit.
    Migrate,
    /// Create a SuperAdmin account.
    CreateSuperadmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "SUPERADMIN_PASSWORD")]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "virtuaid_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::from_env()?;

    let pool = db::connect_pool(&cfg.database_url, cfg.database_max_connections).await?;
    db::migrate(&pool).await?;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg, pool.clone()).await,
        Command::Migrate => {
            info!("migrations_applied");
            Ok(())
        }
        Command::CreateSuperadmin {
            email,
            name,
            password,
        } => create_superadmin(&pool, &email, &name, password).await,
    };
    pool.close().await;
    result
}

async fn create_superadmin(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            eprintln!("Password:");
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let repo = SqlxUserRepository::new(pool.clone());
    let manager = UserManager { repo: &repo };
    let user = manager
        .create_superadmin(email, name, &password, None, None)
        .await
        .context("create superadmin")?;
    info!(user_id = %user.id, email = %user.email, "superadmin_created");
    Ok(())
}

fn build_cors(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::PATCH,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    let origin = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(v)) => AllowOrigin::exact(v),
        // Production config validation guarantees a parseable origin.
        _ if cfg.is_production => AllowOrigin::exact(HeaderValue::from_static("http://invalid")),
        _ => AllowOrigin::mirror_request(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

async fn serve(cfg: Config, pool: PgPool) -> anyhow::Result<()> {
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        uploads_dir = %cfg.uploads_dir,
        "starting VirtuAid backend"
    );

    if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
        tracing::warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
    }

    let uploads = Arc::new(FsUploadStore::new(&cfg.uploads_dir));
    let services = AppServices::new(
        Arc::new(SqlxUserRepository::new(pool.clone())),
        Arc::new(SqlxCareHomeRepository::new(pool.clone())),
        Arc::new(SqlxCareHomeManagerRepository::new(pool.clone())),
        Arc::new(SqlxResidentRepository::new(pool.clone())),
        Arc::new(SqlxFeedbackRepository::new(pool.clone())),
        Arc::new(SqlxReportRepository::new(pool.clone())),
        uploads.clone(),
        Arc::new(SqlxSessionRepository::new(pool.clone())),
        Arc::new(SqlxVideoRepository::new(pool.clone())),
        uploads,
        Arc::new(SqlxRevokedTokenRepository::new(pool.clone())),
        Arc::new(PgHealthCheck::new(pool)),
    );
    let cors = build_cors(&cfg);
    let ctx = AppContext::new(cfg.clone(), services);

    let app = router(ctx).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
            let method = req.method().clone();
            let uri = req.uri().clone();
            let matched = req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            tracing::info_span!("http", %method, %uri, matched_path = %matched)
        }),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(%e, "Error handling Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(%e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, initiating graceful shutdown");
}
