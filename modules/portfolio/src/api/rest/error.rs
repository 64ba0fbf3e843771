use axum::http::StatusCode;
use hubkit::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.portfohub.dev/{code}"))
        .with_code(code)
        .with_instance(instance);
    ProblemResponse(problem)
}

/// Map a domain error that no form can absorb to an RFC 9457 response.
///
/// Not-found never says whether the row exists for someone else.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { resource } => from_parts(
            StatusCode::NOT_FOUND,
            "PORTFOLIO_NOT_FOUND",
            "Not Found",
            format!("{resource} not found"),
            instance,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::UNPROCESSABLE_ENTITY,
            "PORTFOLIO_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::InvalidCredentials => from_parts(
            StatusCode::UNAUTHORIZED,
            "PORTFOLIO_INVALID_CREDENTIALS",
            "Unauthorized",
            "Invalid username/email or password",
            instance,
        ),
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
        DomainError::Storage { .. } => {
            tracing::error!(error = ?e, "Upload storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_STORAGE",
                "Internal error",
                "An internal storage error occurred",
                instance,
            )
        }
        DomainError::Internal { .. } => {
            tracing::error!(error = ?e, "Internal error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_hide_details() {
        let p = map_domain_error(&DomainError::database("disk I/O error at /var/db"), "/x").0;
        assert_eq!(p.status, 500);
        assert!(!p.detail.contains("disk"));
        assert_eq!(p.instance, "/x");
    }

    #[test]
    fn not_found_is_generic() {
        let p = map_domain_error(&DomainError::not_found("Portfolio item"), "/portfolio/7/edit").0;
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "PORTFOLIO_NOT_FOUND");
        assert_eq!(p.detail, "Portfolio item not found");
    }
}
