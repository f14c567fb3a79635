use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use uuid::Uuid;

use crate::application::errors::ConstraintViolation;
use crate::application::ports::user_repository::{NewUserRecord, UserRepository};
use crate::domain::users::role::Role;
use crate::domain::users::user::User;

pub const USER_NAME_MAX: usize = 125;
const USERNAME_ATTEMPTS: usize = 50;
/// Prefix marking a password that can never match (account created
/// without a password).
const UNUSABLE_PASSWORD_PREFIX: char = '!';

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("{0} must have an email address")]
    MissingEmail(Role),
    #[error("{0} must have a name")]
    MissingName(Role),
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("Name must be at most {USER_NAME_MAX} characters.")]
    NameTooLong,
    #[error("A user with this email already exists.")]
    DuplicateEmail,
    #[error(
        "Generic create_user is not supported. Use create_superadmin, create_admin, or create_manager instead."
    )]
    GenericCreationUnsupported,
    #[error("failed to hash password")]
    Hash,
    #[error(transparent)]
    Storage(anyhow::Error),
}

/// Input for [`UserManager::create_user`]. `role` picks the factory.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub created_by: Option<Uuid>,
    pub role: Option<Role>,
}

/// Creates users. Each role has its own factory; the generic entry point
/// only dispatches when a role is named.
pub struct UserManager<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UserManager<'a, R> {
    pub async fn create_user(&self, new: NewUser) -> Result<User, UserError> {
        match new.role {
            Some(Role::SuperAdmin) => {
                self.create_superadmin(
                    &new.email,
                    &new.name,
                    new.password.as_deref().unwrap_or_default(),
                    new.username,
                    new.avatar,
                )
                .await
            }
            Some(Role::Admin) => {
                self.create_admin(
                    &new.email,
                    &new.name,
                    new.password.as_deref(),
                    new.created_by,
                    new.username,
                    new.avatar,
                )
                .await
            }
            Some(Role::Manager) => {
                self.create_manager(
                    &new.email,
                    &new.name,
                    new.password.as_deref(),
                    new.created_by,
                    new.username,
                    new.avatar,
                )
                .await
            }
            None => Err(UserError::GenericCreationUnsupported),
        }
    }

    pub async fn create_superadmin(
        &self,
        email: &str,
        name: &str,
        password: &str,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, UserError> {
        self.create_with_role(Role::SuperAdmin, email, name, Some(password), None, username, avatar)
            .await
    }

    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
        created_by: Option<Uuid>,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, UserError> {
        self.create_with_role(Role::Admin, email, name, password, created_by, username, avatar)
            .await
    }

    pub async fn create_manager(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
        created_by: Option<Uuid>,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, UserError> {
        self.create_with_role(Role::Manager, email, name, password, created_by, username, avatar)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_with_role(
        &self,
        role: Role,
        email: &str,
        name: &str,
        password: Option<&str>,
        created_by: Option<Uuid>,
        username: Option<String>,
        avatar: Option<String>,
    ) -> Result<User, UserError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(UserError::MissingEmail(role));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(UserError::MissingName(role));
        }
        if name.chars().count() > USER_NAME_MAX {
            return Err(UserError::NameTooLong);
        }
        if !is_valid_email(email) {
            return Err(UserError::InvalidEmail);
        }
        let email = normalize_email(email);
        if self
            .repo
            .find_by_email(&email)
            .await
            .map_err(UserError::Storage)?
            .is_some()
        {
            return Err(UserError::DuplicateEmail);
        }

        let username = match username.filter(|u| !u.trim().is_empty()) {
            Some(u) => u,
            None => self.generate_unique_username(email_local_part(&email)).await?,
        };
        let password_hash = match password.filter(|p| !p.is_empty()) {
            Some(p) => hash_password(p)?,
            None => unusable_password(),
        };

        let user = self
            .repo
            .create_user(NewUserRecord {
                email,
                username,
                name: name.to_string(),
                password_hash,
                role,
                avatar,
                created_by,
            })
            .await
            .map_err(|e| {
                if e.downcast_ref::<ConstraintViolation>().is_some() {
                    UserError::DuplicateEmail
                } else {
                    UserError::Storage(e)
                }
            })?;
        tracing::info!(user_id = %user.id, role = %user.role, "user_created");
        Ok(user)
    }

    /// `base` plus four random digits, retried until unused.
    async fn generate_unique_username(&self, base: &str) -> Result<String, UserError> {
        for _ in 0..USERNAME_ATTEMPTS {
            let candidate = format!("{base}{}", random_digits(4));
            if !self
                .repo
                .username_exists(&candidate)
                .await
                .map_err(UserError::Storage)?
            {
                return Ok(candidate);
            }
        }
        Ok(format!("{base}{}", random_digits(8)))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Lower-cases the domain part; the local part is kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

fn random_digits(n: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

fn unusable_password() -> String {
    let tail: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect();
    format!("{UNUSABLE_PASSWORD_PREFIX}{tail}")
}

pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| UserError::Hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::filters::UserFilter;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct VecUsers {
        rows: Mutex<Vec<(User, String)>>,
    }

    #[async_trait]
    impl UserRepository for VecUsers {
        async fn create_user(&self, record: NewUserRecord) -> anyhow::Result<User> {
            let now = Utc::now();
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
            self.rows
                .lock()
                .unwrap()
                .push((user.clone(), record.password_hash));
            Ok(user)
        }

        async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
        }

        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|(u, _)| u.email == email)
                .map(|(u, _)| u.clone()))
        }

        async fn find_credentials(&self, email: &str) -> anyhow::Result<Option<(User, String)>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|(u, _)| u.email == email).cloned())
        }

        async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .any(|(u, _)| u.username.as_deref() == Some(username)))
        }

        async fn list(&self, _filter: &UserFilter) -> anyhow::Result<Vec<User>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().map(|(u, _)| u.clone()).collect())
        }

        async fn update_profile(&self, user: &User) -> anyhow::Result<Option<User>> {
            Ok(Some(user.clone()))
        }

        async fn delete_user(&self, _id: Uuid) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn factories_assign_their_role() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        let sa = manager
            .create_superadmin("root@example.com", "Super Admin", "password123", None, None)
            .await
            .unwrap();
        let admin = manager
            .create_admin("admin@example.com", "Test Admin", Some("password123"), Some(sa.id), None, None)
            .await
            .unwrap();
        let mgr = manager
            .create_manager("manager@example.com", "Test Manager", Some("password123"), Some(admin.id), None, None)
            .await
            .unwrap();

        assert_eq!(sa.role, Role::SuperAdmin);
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(mgr.role, Role::Manager);
        assert!(sa.is_superadmin() && !sa.is_admin() && !sa.is_manager());
        assert_eq!(admin.created_by, Some(sa.id));
        assert_eq!(mgr.created_by, Some(admin.id));
        assert_eq!(mgr.to_string(), "Test Manager");
    }

    #[tokio::test]
    async fn generic_creation_without_role_is_rejected() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        let err = manager
            .create_user(NewUser {
                email: "plain@example.com".into(),
                name: "Plain".into(),
                password: Some("password123".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::GenericCreationUnsupported));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generic_creation_dispatches_on_role() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        let user = manager
            .create_user(NewUser {
                email: "m@example.com".into(),
                name: "M".into(),
                password: Some("password123".into()),
                role: Some(Role::Manager),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(user.role, Role::Manager);
    }

    #[tokio::test]
    async fn usernames_derive_from_email_and_stay_unique() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        let a = manager
            .create_admin("admin@example.com", "A", Some("pw"), None, None, None)
            .await
            .unwrap();
        let b = manager
            .create_admin("another_admin@example.com", "B", Some("pw"), None, None, None)
            .await
            .unwrap();
        let ua = a.username.unwrap();
        let ub = b.username.unwrap();
        assert!(ua.starts_with("admin") && ua.len() == "admin".len() + 4);
        assert!(ub.starts_with("another_admin"));
        assert_ne!(ua, ub);
    }

    #[tokio::test]
    async fn validates_required_fields_and_duplicates() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        assert!(matches!(
            manager.create_admin("", "A", None, None, None, None).await,
            Err(UserError::MissingEmail(Role::Admin))
        ));
        assert!(matches!(
            manager.create_manager("m@example.com", " ", None, None, None, None).await,
            Err(UserError::MissingName(Role::Manager))
        ));
        assert!(matches!(
            manager.create_manager("not-an-email", "M", None, None, None, None).await,
            Err(UserError::InvalidEmail)
        ));
        manager
            .create_manager("dup@Example.COM", "M", None, None, None, None)
            .await
            .unwrap();
        assert!(matches!(
            manager.create_admin("dup@example.com", "A", None, None, None, None).await,
            Err(UserError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn passwords_are_hashed_and_verifiable() {
        let repo = VecUsers::default();
        let manager = UserManager { repo: &repo };
        manager
            .create_superadmin("root@example.com", "Root", "password123", None, None)
            .await
            .unwrap();
        manager
            .create_manager("nopw@example.com", "No Password", None, None, None, None)
            .await
            .unwrap();
        let (_, hash) = repo.find_credentials("root@example.com").await.unwrap().unwrap();
        assert_ne!(hash, "password123");
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("wrong", &hash));

        let (_, unusable) = repo.find_credentials("nopw@example.com").await.unwrap().unwrap();
        assert!(!verify_password("", &unusable));
    }

    #[test]
    fn email_normalisation_lowercases_domain_only() {
        assert_eq!(normalize_email(" Jane.Doe@Example.COM "), "Jane.Doe@example.com");
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
    }
}
