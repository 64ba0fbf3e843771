use std::sync::Arc;

use axum::{
    extract::Query,
    http::{StatusCode, Uri},
    response::Response,
    Extension,
};
use hubkit::{Flash, FlashLevel, FormData, ProblemResponse, Session};
use tracing::{error, info};

use crate::api::rest::dto::{self, LoginView, NextQuery, RegisterView};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::MaybeUser;
use crate::api::rest::views;
use crate::domain::error::DomainError;
use crate::i18n;
use crate::module::Services;

pub async fn register_form(session: Session, MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return views::see_other("/");
    }
    views::render(&session, None, RegisterView::default())
}

pub async fn register(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    MaybeUser(user): MaybeUser,
    uri: Uri,
    form: FormData,
) -> Result<Response, ProblemResponse> {
    if user.is_some() {
        return Ok(views::see_other("/"));
    }

    match svc.auth.register(dto::registration(&form)).await {
        Ok(_) => {
            views::flash(&session, FlashLevel::Success, "flash_registered");
            Ok(views::see_other("/login"))
        }
        Err(DomainError::Validation { issues }) => {
            info!(count = issues.len(), "Registration rejected");
            Ok(views::render_invalid(
                &session,
                None,
                &issues,
                dto::register_echo(&form),
            ))
        }
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn login_form(
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return views::see_other("/");
    }
    let view = LoginView {
        username: String::new(),
        next: query.next,
    };
    views::render(&session, None, view)
}

/// Check credentials and start a fresh session. `remember` makes the cookie
/// outlive the browser session.
pub async fn login(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
    uri: Uri,
    form: FormData,
) -> Result<Response, ProblemResponse> {
    if user.is_some() {
        return Ok(views::see_other("/"));
    }
    let next = query.next.or_else(|| form.optional("next"));

    match svc
        .auth
        .login(form.text("username"), form.text("password"))
        .await
    {
        Ok(user) => {
            session.login(user.id, form.checked("remember"));
            views::flash(&session, FlashLevel::Success, "flash_logged_in");
            Ok(views::see_other(
                views::safe_next(next.as_deref()).unwrap_or("/"),
            ))
        }
        Err(DomainError::InvalidCredentials) => {
            let lang = views::current_lang(&session);
            let notice = Flash {
                level: FlashLevel::Danger,
                message: i18n::translate(lang, "flash_invalid_credentials").to_string(),
            };
            let view = LoginView {
                username: form.trimmed("username"),
                next,
            };
            Ok(views::render_with(
                StatusCode::UNAUTHORIZED,
                &session,
                None,
                vec![notice],
                view,
            ))
        }
        Err(e) => {
            error!("Failed to log in: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn logout(session: Session) -> Response {
    session.clear();
    views::flash(&session, FlashLevel::Info, "flash_logged_out");
    views::see_other("/")
}
