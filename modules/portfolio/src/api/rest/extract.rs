//! Current-user extractors.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use hubkit::{problem::internal_error, FlashLevel, Session};

use crate::api::rest::error::map_domain_error;
use crate::api::rest::views;
use crate::contract::model::User;
use crate::module::Services;

async fn resolve(parts: &Parts) -> Result<(Session, Option<User>), Response> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| internal_error("Session layer is not installed").into_response())?;
    let services = parts
        .extensions
        .get::<Arc<Services>>()
        .cloned()
        .ok_or_else(|| internal_error("Portfolio services are not installed").into_response())?;

    let user = services
        .auth
        .current_user(session.user_id())
        .await
        .map_err(|e| map_domain_error(&e, parts.uri.path()).into_response())?;
    Ok((session, user))
}

/// Signed-in user if any. A session pointing at a deleted account is
/// anonymous.
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, user) = resolve(parts).await?;
        Ok(MaybeUser(user))
    }
}

/// Signed-in user, or a redirect to the login page that comes back here.
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match resolve(parts).await? {
            (_, Some(user)) => Ok(RequireUser(user)),
            (session, None) => {
                views::flash(&session, FlashLevel::Warning, "flash_login_required");
                let next = urlencoding::encode(parts.uri.path());
                Err(views::see_other(&format!("/login?next={next}")))
            }
        }
    }
}
