use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::application::access::Scope;
use crate::application::errors::ConstraintViolation;

pub type PgPool = Pool<Postgres>;

pub async fn connect_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Compile-time embedded migrations under `./migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Row filter over a `carehomes c` join. Binds `$1` to the scope kind and
/// `$2` to its subject.
pub(crate) const SCOPE_FILTER: &str = r#"(
    $1 = 'all'
    OR ($1 = 'admin' AND c.admin_id = $2::uuid)
    OR ($1 = 'manager' AND EXISTS (
        SELECT 1 FROM carehome_managers cm
        WHERE cm.carehome_id = c.id AND cm.manager_id = $2::uuid))
)"#;

pub(crate) fn scope_binds(scope: Scope) -> (&'static str, Option<Uuid>) {
    (scope.kind(), scope.subject())
}

/// `ILIKE` pattern matching `term` anywhere, with `\`, `%` and `_` taken
/// literally. Pair with `ESCAPE '\'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Turns unique (23505) and foreign-key (23503) failures into a typed
/// [`ConstraintViolation`]; everything else passes through.
pub(crate) fn map_db_error(err: sqlx::Error) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some("23505") => {
                return anyhow::Error::new(ConstraintViolation::Unique(
                    unique_message(db.constraint()).to_string(),
                ));
            }
            Some("23503") => {
                return anyhow::Error::new(ConstraintViolation::ForeignKey(
                    "This record is still referenced by other records.".to_string(),
                ));
            }
            _ => {}
        }
    }
    anyhow::Error::new(err)
}

fn unique_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "A user with this email already exists.",
        Some("users_username_key") => "A user with this username already exists.",
        Some("carehomes_name_address_key") => {
            "A care home with the same name and address already exists."
        }
        Some("carehomes_code_key") => "A care home with this code already exists.",
        Some("carehome_managers_manager_id_carehome_id_key") => {
            "This manager is already assigned to this care home."
        }
        Some("reports_resident_id_report_month_key") => {
            "A report for this resident and month already exists."
        }
        Some("therapy_sessions_feedback_id_key") => {
            "This feedback is already linked to another session."
        }
        _ => "A record with these values already exists.",
    }
}

pub struct PgHealthCheck {
    pub pool: PgPool,
}

impl PgHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl crate::application::ports::health_check::HealthCheck for PgHealthCheck {
    async fn ping(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = ?err, "database ping failed");
                false
            }
        }
    }
}

pub mod repositories;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_messages_follow_constraint_names() {
        assert_eq!(
            unique_message(Some("reports_resident_id_report_month_key")),
            "A report for this resident and month already exists."
        );
        assert_eq!(unique_message(None), "A record with these values already exists.");
    }

    #[test]
    fn search_patterns_escape_wildcards() {
        assert_eq!(contains_pattern("Ann"), "%Ann%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_db_error(sqlx::Error::RowNotFound);
        assert!(err.downcast_ref::<ConstraintViolation>().is_none());
    }
}
