//! Cookie-backed sessions.
//!
//! The whole session lives client-side in one signed cookie. The
//! [`session_layer`] middleware decodes it into a [`Session`] handle placed in
//! request extensions and writes it back only when a handler changed it.

mod codec;
mod middleware;

pub use codec::SessionCodec;
pub use middleware::{session_layer, SessionConfig};

use axum::{extract::FromRequestParts, http::request::Parts};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::problem::{internal_error, ProblemResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Warning,
    Info,
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
    #[serde(default)]
    pub permanent: bool,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        *self == SessionData::default()
    }
}

#[derive(Debug, Default)]
struct State {
    data: SessionData,
    modified: bool,
}

/// Shared handle to the current request's session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<State>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                data,
                modified: false,
            })),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut state = self.inner.lock();
        state.modified = true;
        f(&mut state.data)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.inner.lock().data.user_id
    }

    /// Start an authenticated session on top of an emptied one, so nothing
    /// from before login (token, language, flashes) carries over.
    pub fn login(&self, user_id: i64, permanent: bool) {
        self.update(|d| {
            *d = SessionData {
                user_id: Some(user_id),
                permanent,
                ..SessionData::default()
            };
        });
    }

    /// Drop everything the session holds.
    pub fn clear(&self) {
        self.update(|d| *d = SessionData::default());
    }

    /// Current CSRF token, created on first use.
    pub fn csrf_token(&self) -> String {
        if let Some(token) = self.peek_csrf_token() {
            return token;
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.update(|d| d.csrf_token = Some(token.clone()));
        token
    }

    /// Token without creating one.
    pub fn peek_csrf_token(&self) -> Option<String> {
        self.inner.lock().data.csrf_token.clone()
    }

    pub fn lang(&self) -> Option<String> {
        self.inner.lock().data.lang.clone()
    }

    pub fn set_lang(&self, code: impl Into<String>) {
        let code = code.into();
        self.update(|d| d.lang = Some(code));
    }

    pub fn flash(&self, level: FlashLevel, message: impl Into<String>) {
        let message = message.into();
        self.update(|d| d.flashes.push(Flash { level, message }));
    }

    /// Remove and return pending flashes.
    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut state = self.inner.lock();
        if state.data.flashes.is_empty() {
            return Vec::new();
        }
        state.modified = true;
        std::mem::take(&mut state.data.flashes)
    }

    pub fn is_permanent(&self) -> bool {
        self.inner.lock().data.permanent
    }

    pub fn is_modified(&self) -> bool {
        self.inner.lock().modified
    }

    pub fn snapshot(&self) -> SessionData {
        self.inner.lock().data.clone()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| internal_error("Session layer is not installed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_does_not_mark_modified() {
        let s = Session::new(SessionData {
            user_id: Some(3),
            ..Default::default()
        });
        assert_eq!(s.user_id(), Some(3));
        assert!(s.peek_csrf_token().is_none());
        assert!(s.take_flashes().is_empty());
        assert!(!s.is_modified());
    }

    #[test]
    fn csrf_token_is_created_once() {
        let s = Session::default();
        let first = s.csrf_token();
        assert_eq!(first.len(), 32);
        assert!(s.is_modified());
        assert_eq!(s.csrf_token(), first);
    }

    #[test]
    fn flashes_are_consumed_in_order() {
        let s = Session::default();
        s.flash(FlashLevel::Success, "one");
        s.flash(FlashLevel::Info, "two");

        let flashes = s.take_flashes();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].message, "one");
        assert_eq!(flashes[1].level, FlashLevel::Info);
        assert!(s.take_flashes().is_empty());
    }

    #[test]
    fn login_starts_from_an_empty_session() {
        let s = Session::default();
        s.set_lang("ru");
        let token = s.csrf_token();
        s.flash(FlashLevel::Warning, "stale");

        s.login(42, true);

        let data = s.snapshot();
        assert_eq!(data.user_id, Some(42));
        assert!(data.permanent);
        assert_eq!(data.lang, None);
        assert!(data.flashes.is_empty());
        assert_ne!(s.csrf_token(), token);
    }

    #[test]
    fn clear_drops_everything() {
        let s = Session::default();
        s.login(1, true);
        s.set_lang("uz");
        s.clear();

        let data = s.snapshot();
        assert_eq!(data.user_id, None);
        assert!(!data.permanent);
        assert_eq!(data.lang, None);
        assert_eq!(data.csrf_token, None);
    }

    #[test]
    fn flash_level_serializes_lowercase() {
        let json = serde_json::to_string(&FlashLevel::Danger).unwrap();
        assert_eq!(json, "\"danger\"");
    }
}
