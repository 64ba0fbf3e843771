use thiserror::Error;

/// A single user-facing validation failure.
///
/// Issues are collected rather than returned one at a time so a form can
/// show every problem at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    FullNameRequired,
    UsernameRequired,
    UsernameTooShort,
    EmailRequired,
    PasswordRequired,
    PasswordMismatch,
    PasswordTooShort,
    UsernameTaken,
    EmailTaken,
    TitleRequired,
    AvatarNotImage,
    ImageNotImage,
}

impl ValidationIssue {
    /// Translation key of the message.
    pub fn key(self) -> &'static str {
        match self {
            Self::FullNameRequired => "err_full_name_required",
            Self::UsernameRequired => "err_username_required",
            Self::UsernameTooShort => "err_username_too_short",
            Self::EmailRequired => "err_email_required",
            Self::PasswordRequired => "err_password_required",
            Self::PasswordMismatch => "err_password_mismatch",
            Self::PasswordTooShort => "err_password_too_short",
            Self::UsernameTaken => "err_username_taken",
            Self::EmailTaken => "err_email_taken",
            Self::TitleRequired => "err_title_required",
            Self::AvatarNotImage => "err_avatar_not_image",
            Self::ImageNotImage => "err_image_not_image",
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {issues:?}")]
    Validation { issues: Vec<ValidationIssue> },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Invalid username/email or password")]
    InvalidCredentials,

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation { issues }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Accumulates issues and turns them into a `Validation` error at the end.
#[derive(Debug, Default)]
pub(crate) struct Issues(Vec<ValidationIssue>);

impl Issues {
    pub(crate) fn push(&mut self, issue: ValidationIssue) {
        self.0.push(issue);
    }

    pub(crate) fn check(&mut self, ok: bool, issue: ValidationIssue) {
        if !ok {
            self.0.push(issue);
        }
    }

    pub(crate) fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.0))
        }
    }
}
