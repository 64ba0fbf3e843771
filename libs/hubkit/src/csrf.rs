//! Synchronizer-token CSRF protection.
//!
//! Every POST, PUT, PATCH and DELETE must echo the session's token in the
//! `csrf_token` form field or, when that field is empty, in the `X-CSRFToken`
//! header. Requests that don't are answered with 400 before any handler runs. The guard must sit
//! inside [`crate::session::session_layer`].

use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::form::{FormData, FormError};
use crate::problem::{bad_request, ProblemResponse};
use crate::session::Session;

pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Largest body the guard will buffer while looking for the form token.
#[derive(Debug, Clone, Copy)]
pub struct CsrfConfig {
    pub max_body_bytes: usize,
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn tokens_match(expected: &str, provided: &str) -> bool {
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
}

/// The form field wins; the header is only consulted when the field is empty.
fn submitted_token<'a>(field: &'a str, header: &'a str) -> &'a str {
    if field.is_empty() {
        header
    } else {
        field
    }
}

fn reject(req_id: Option<String>, path: &str) -> Response {
    bad_request("CSRF token missing or invalid")
        .with_code("CSRF_INVALID")
        .with_instance(path)
        .with_request_id(req_id)
        .into_response()
}

pub async fn csrf_guard(State(cfg): State<CsrfConfig>, req: Request, next: Next) -> Response {
    if !is_state_changing(req.method()) {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    let req_id = crate::request_id(req.headers());
    let expected = req
        .extensions()
        .get::<Session>()
        .and_then(Session::peek_csrf_token);
    let Some(expected) = expected else {
        tracing::debug!(path = %path, "state-changing request without a session token");
        return reject(req_id, &path);
    };

    // Buffer the form so the token field can be read; handlers get the
    // parsed form back through request extensions.
    let (mut parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, cfg.max_body_bytes).await {
        Ok(b) => b,
        Err(_) => {
            return ProblemResponse::from(FormError::TooLarge)
                .with_instance(path)
                .with_request_id(req_id)
                .into_response()
        }
    };
    let form = match FormData::from_bytes(&parts.headers, &parts.extensions, bytes.clone()).await {
        Ok(form) => form,
        Err(e) => {
            return ProblemResponse::from(e)
                .with_instance(path)
                .with_request_id(req_id)
                .into_response()
        }
    };

    let header_token = parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !tokens_match(&expected, submitted_token(form.text(CSRF_FIELD), header_token)) {
        tracing::debug!(path = %path, "CSRF token mismatch");
        return reject(req_id, &path);
    }

    parts.extensions.insert(form);
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mutating_methods_are_guarded() {
        assert!(is_state_changing(&Method::POST));
        assert!(is_state_changing(&Method::DELETE));
        assert!(!is_state_changing(&Method::GET));
        assert!(!is_state_changing(&Method::HEAD));
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "ab"));
        assert!(!tokens_match("", ""));
    }

    #[test]
    fn form_field_takes_precedence_over_header() {
        assert_eq!(submitted_token("form", "header"), "form");
        assert_eq!(submitted_token("", "header"), "header");
        assert_eq!(submitted_token("", ""), "");
    }
}
