use std::sync::Arc;

use axum::{
    extract::Path,
    http::Uri,
    response::Response,
    Extension,
};
use hubkit::{FlashLevel, FormData, ProblemResponse, Session};
use tracing::error;

use crate::api::rest::dto::{self, ProfileView, PublicProfileView, PublicUserDto, SettingsView};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{MaybeUser, RequireUser};
use crate::api::rest::views;
use crate::domain::error::DomainError;
use crate::module::Services;

/// The caller's own profile, private items included.
pub async fn own(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let items = svc.profile.own_profile(&user).await.map_err(|e| {
        error!("Failed to load own profile: {}", e);
        map_domain_error(&e, uri.path())
    })?;
    let view = ProfileView {
        user: (&user).into(),
        portfolios: dto::items_dto(&items),
    };
    Ok(views::render(&session, Some(&user), view))
}

pub async fn public(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let (owner, items) = svc
        .profile
        .public_profile(&username)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    let view = PublicProfileView {
        user: PublicUserDto::from(&owner),
        portfolios: dto::items_dto(&items),
    };
    Ok(views::render(&session, viewer.as_ref(), view))
}

pub async fn settings_form(session: Session, RequireUser(user): RequireUser) -> Response {
    let view = SettingsView {
        user: (&user).into(),
    };
    views::render(&session, Some(&user), view)
}

pub async fn update_settings(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    uri: Uri,
    form: FormData,
) -> Result<Response, ProblemResponse> {
    let update = dto::profile_update(&form);
    let avatar = dto::upload(&form, "avatar");

    match svc
        .profile
        .update_settings(user.clone(), update, avatar)
        .await
    {
        Ok(_) => {
            views::flash(&session, FlashLevel::Success, "flash_profile_updated");
            Ok(views::see_other("/settings"))
        }
        Err(DomainError::Validation { issues }) => {
            let view = SettingsView {
                user: (&user).into(),
            };
            Ok(views::render_invalid(&session, Some(&user), &issues, view))
        }
        Err(e) => {
            error!("Failed to update settings: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
