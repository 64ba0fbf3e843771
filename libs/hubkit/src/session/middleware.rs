use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};
use std::{sync::Arc, time::Duration};

use super::{Session, SessionCodec, SessionData};

pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub codec: SessionCodec,
    /// Lifetime of "remember me" sessions.
    pub permanent_lifetime: Duration,
    pub secure: bool,
}

impl SessionConfig {
    pub fn new(
        secret: &str,
        permanent_lifetime: Duration,
    ) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            codec: SessionCodec::new(secret.as_bytes())?,
            permanent_lifetime,
            secure: false,
        })
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn read(&self, headers: &HeaderMap) -> SessionData {
        let now = chrono::Utc::now().timestamp();
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == self.cookie_name)
            .and_then(|c| self.codec.decode(c.value(), self.permanent_lifetime, now))
            .unwrap_or_default()
    }

    /// `Set-Cookie` value for `data`; an empty session deletes the cookie.
    pub fn set_cookie_header(&self, data: &SessionData) -> Option<HeaderValue> {
        let value = if data.is_empty() {
            String::new()
        } else {
            match self.codec.encode(data, chrono::Utc::now().timestamp()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode session");
                    return None;
                }
            }
        };

        let mut builder = Cookie::build((self.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        if data.is_empty() {
            builder = builder.max_age(cookie::time::Duration::ZERO);
        } else if data.permanent {
            let secs = i64::try_from(self.permanent_lifetime.as_secs()).unwrap_or(i64::MAX);
            builder = builder.max_age(cookie::time::Duration::seconds(secs));
        }

        HeaderValue::from_str(&builder.build().to_string()).ok()
    }
}

/// Middleware: decode the cookie, expose a [`Session`], persist changes.
pub async fn session_layer(
    State(cfg): State<Arc<SessionConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = Session::new(cfg.read(req.headers()));
    req.extensions_mut().insert(session.clone());

    let mut resp = next.run(req).await;

    if session.is_modified() {
        if let Some(value) = cfg.set_cookie_header(&session.snapshot()) {
            resp.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    resp
}
