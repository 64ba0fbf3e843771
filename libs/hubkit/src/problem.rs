use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details.
///
/// Used for faults only (bad CSRF token, missing resources, storage errors).
/// Expected outcomes such as validation messages travel as flashes instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    /// Machine-readable code, e.g. `CSRF_INVALID`.
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Renders a [`Problem`] with its status and `application/problem+json`.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl ProblemResponse {
    pub fn with_instance(self, uri: impl Into<String>) -> Self {
        Self(self.0.with_instance(uri))
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        Self(self.0.with_code(code))
    }

    pub fn with_request_id(self, id: Option<String>) -> Self {
        match id {
            Some(id) => Self(self.0.with_request_id(id)),
            None => self,
        }
    }
}

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

pub fn bad_request(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail).into()
}

pub fn not_found(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::NOT_FOUND, "Not Found", detail).into()
}

pub fn payload_too_large(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", detail).into()
}

pub fn internal_error(detail: impl Into<String>) -> ProblemResponse {
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        detail,
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_response_sets_status_and_content_type() {
        let resp = bad_request("invalid payload").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn builder_fills_optional_parts() {
        let p = not_found("Portfolio item not found")
            .with_code("NOT_FOUND")
            .with_instance("/portfolio/7/edit")
            .with_request_id(Some("req-1".into()))
            .0;

        assert_eq!(p.status, 404);
        assert_eq!(p.code, "NOT_FOUND");
        assert_eq!(p.instance, "/portfolio/7/edit");
        assert_eq!(p.request_id.as_deref(), Some("req-1"));

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "about:blank");
    }

    #[test]
    fn request_id_is_omitted_when_absent() {
        let p = internal_error("boom").with_request_id(None).0;
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("request_id").is_none());
        assert_eq!(json["status"], 500);
    }

    #[test]
    fn payload_too_large_maps_to_413() {
        assert_eq!(payload_too_large("too big").0.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
