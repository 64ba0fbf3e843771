use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::contract::model::{NewUser, Registration, User};
use crate::domain::error::{DomainError, Issues, ValidationIssue};
use crate::domain::ports::PasswordHasher;
use crate::domain::repo::UsersRepository;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration, credential checks and session user lookup.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Validate the form, reporting every problem at once, then create the
    /// account. Username and email are normalized to lowercase first.
    #[instrument(
        name = "portfolio.auth.register",
        skip(self, form),
        fields(username = %form.username.trim())
    )]
    pub async fn register(&self, form: Registration) -> Result<User, DomainError> {
        let full_name = form.full_name.trim().to_string();
        let username = form.username.trim().to_lowercase();
        let email = form.email.trim().to_lowercase();

        let mut issues = Issues::default();
        issues.check(!full_name.is_empty(), ValidationIssue::FullNameRequired);
        if username.is_empty() {
            issues.push(ValidationIssue::UsernameRequired);
        } else if username.chars().count() < MIN_USERNAME_LEN {
            issues.push(ValidationIssue::UsernameTooShort);
        }
        issues.check(!email.is_empty(), ValidationIssue::EmailRequired);
        if form.password.is_empty() || form.confirm_password.is_empty() {
            issues.push(ValidationIssue::PasswordRequired);
        } else if form.password != form.confirm_password {
            issues.push(ValidationIssue::PasswordMismatch);
        } else if form.password.chars().count() < MIN_PASSWORD_LEN {
            issues.push(ValidationIssue::PasswordTooShort);
        }

        if !username.is_empty() && self.username_taken(&username).await? {
            issues.push(ValidationIssue::UsernameTaken);
        }
        if !email.is_empty() && self.email_taken(&email).await? {
            issues.push(ValidationIssue::EmailTaken);
        }
        issues.finish()?;

        let password_hash = self
            .hasher
            .hash(&form.password)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let user = self
            .users
            .insert(NewUser {
                full_name,
                username,
                email,
                password_hash,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(user_id = user.id, "Registered new user");
        Ok(user)
    }

    /// Check credentials. Unknown identifier and wrong password are the same
    /// error.
    #[instrument(name = "portfolio.auth.login", skip(self, identifier, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, DomainError> {
        let identifier = identifier.trim().to_lowercase();
        let user = self
            .users
            .find_by_login(&identifier)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        match user {
            Some(user) if self.hasher.verify(password, &user.password_hash) => {
                info!(user_id = user.id, "User logged in");
                Ok(user)
            }
            _ => {
                debug!("Login rejected");
                Err(DomainError::InvalidCredentials)
            }
        }
    }

    /// Resolve the session's user id. A dangling id counts as anonymous.
    #[instrument(name = "portfolio.auth.current_user", skip(self))]
    pub async fn current_user(&self, user_id: Option<i64>) -> Result<Option<User>, DomainError> {
        let Some(id) = user_id else {
            return Ok(None);
        };
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if user.is_none() {
            debug!(user_id = id, "Session refers to a missing user");
        }
        Ok(user)
    }

    async fn username_taken(&self, username: &str) -> Result<bool, DomainError> {
        self.users
            .username_exists(username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    async fn email_taken(&self, email: &str) -> Result<bool, DomainError> {
        self.users
            .email_exists(email)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}
