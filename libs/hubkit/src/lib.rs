//! HTTP building blocks shared by the PortfoHub modules.
//!
//! - [`problem`]: RFC 9457 problem responses for faults
//! - [`session`]: signed cookie sessions with flash messages
//! - [`csrf`]: per-session token check on state-changing requests
//! - [`form`]: urlencoded and multipart form extraction

pub mod csrf;
pub mod form;
pub mod problem;
pub mod session;

pub use form::{FormData, UploadedFile};
pub use problem::{Problem, ProblemResponse};
pub use session::{Flash, FlashLevel, Session, SessionConfig};

/// Header carrying the request id set by the ingress layer.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn request_id(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
