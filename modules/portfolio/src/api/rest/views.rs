//! JSON rendering of pages.
//!
//! Every page is `{ "context": PageContext, "view": ... }`. The context holds
//! what every template needs: who is signed in, the CSRF token, the language
//! switcher and pending flash messages (consumed on render).

use std::collections::BTreeMap;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use hubkit::{Flash, FlashLevel, Session};
use serde::Serialize;

use crate::api::rest::dto::UserDto;
use crate::contract::model::User;
use crate::domain::error::ValidationIssue;
use crate::i18n::{self, Language};

#[derive(Debug, Serialize)]
pub struct PageContext {
    pub current_user: Option<UserDto>,
    pub csrf_token: String,
    pub current_lang: &'static str,
    pub languages: &'static [Language],
    pub nav: BTreeMap<&'static str, &'static str>,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    pub fn build(session: &Session, user: Option<&User>, extra: Vec<Flash>) -> Self {
        let lang = current_lang(session);
        let mut flashes = session.take_flashes();
        flashes.extend(extra);
        Self {
            current_user: user.map(UserDto::from),
            csrf_token: session.csrf_token(),
            current_lang: lang,
            languages: i18n::LANGUAGES,
            nav: i18n::nav_labels(lang).into_iter().collect(),
            flashes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<V> {
    pub context: PageContext,
    pub view: V,
}

pub fn current_lang(session: &Session) -> &'static str {
    i18n::resolve_lang(session.lang().as_deref())
}

/// Queue a translated flash for the next rendered page.
pub fn flash(session: &Session, level: FlashLevel, key: &str) {
    let lang = current_lang(session);
    session.flash(level, i18n::translate(lang, key));
}

pub fn render<V: Serialize>(session: &Session, user: Option<&User>, view: V) -> Response {
    render_with(StatusCode::OK, session, user, Vec::new(), view)
}

pub fn render_with<V: Serialize>(
    status: StatusCode,
    session: &Session,
    user: Option<&User>,
    extra: Vec<Flash>,
    view: V,
) -> Response {
    let page = Page {
        context: PageContext::build(session, user, extra),
        view,
    };
    (status, Json(page)).into_response()
}

/// Re-render a form with one danger flash per issue (HTTP 422).
pub fn render_invalid<V: Serialize>(
    session: &Session,
    user: Option<&User>,
    issues: &[ValidationIssue],
    view: V,
) -> Response {
    let lang = current_lang(session);
    let extra = issues
        .iter()
        .map(|i| Flash {
            level: FlashLevel::Danger,
            message: i18n::translate(lang, i.key()).to_string(),
        })
        .collect();
    render_with(StatusCode::UNPROCESSABLE_ENTITY, session, user, extra, view)
}

/// 303 to `to`; falls back to `/` when `to` is not a valid header value.
pub fn see_other(to: &str) -> Response {
    match HeaderValue::from_str(to) {
        Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
        Err(_) => Redirect::to("/").into_response(),
    }
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.starts_with("/\\"))
}
