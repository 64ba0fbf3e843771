use std::sync::Arc;

use axum::{
    extract::Path,
    http::Uri,
    response::Response,
    Extension,
};
use hubkit::{FlashLevel, FormData, ProblemResponse, Session};
use tracing::error;

use crate::api::rest::dto::{self, PortfolioFormView, PortfolioItemDto};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::RequireUser;
use crate::api::rest::views;
use crate::domain::error::DomainError;
use crate::module::Services;

/// Path ids that are not numbers name no item.
fn item_id(raw: &str, instance: &str) -> Result<i64, ProblemResponse> {
    raw.parse()
        .map_err(|_| map_domain_error(&DomainError::not_found("Portfolio item"), instance))
}

pub async fn new_form(session: Session, RequireUser(user): RequireUser) -> Response {
    let view = PortfolioFormView {
        portfolio: None,
        form: None,
    };
    views::render(&session, Some(&user), view)
}

pub async fn create(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    uri: Uri,
    form: FormData,
) -> Result<Response, ProblemResponse> {
    let draft = dto::portfolio_draft(&form);
    let echo = dto::portfolio_echo(&draft);

    match svc
        .items
        .create(user.id, draft, dto::upload(&form, "image"))
        .await
    {
        Ok(_) => {
            views::flash(&session, FlashLevel::Success, "flash_item_created");
            Ok(views::see_other("/profile"))
        }
        Err(DomainError::Validation { issues }) => {
            let view = PortfolioFormView {
                portfolio: None,
                form: Some(echo),
            };
            Ok(views::render_invalid(&session, Some(&user), &issues, view))
        }
        Err(e) => {
            error!("Failed to create portfolio item: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn edit_form(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let id = item_id(&raw_id, uri.path())?;
    let item = svc
        .items
        .get_owned(user.id, id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    let view = PortfolioFormView {
        portfolio: Some(PortfolioItemDto::from(&item)),
        form: None,
    };
    Ok(views::render(&session, Some(&user), view))
}

pub async fn update(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(raw_id): Path<String>,
    uri: Uri,
    form: FormData,
) -> Result<Response, ProblemResponse> {
    let id = item_id(&raw_id, uri.path())?;
    let draft = dto::portfolio_draft(&form);
    let echo = dto::portfolio_echo(&draft);

    match svc
        .items
        .update(user.id, id, draft, dto::upload(&form, "image"))
        .await
    {
        Ok(_) => {
            views::flash(&session, FlashLevel::Success, "flash_item_updated");
            Ok(views::see_other("/profile"))
        }
        Err(DomainError::Validation { issues }) => {
            let stored = svc
                .items
                .get_owned(user.id, id)
                .await
                .map_err(|e| map_domain_error(&e, uri.path()))?;
            let view = PortfolioFormView {
                portfolio: Some(PortfolioItemDto::from(&stored)),
                form: Some(echo),
            };
            Ok(views::render_invalid(&session, Some(&user), &issues, view))
        }
        Err(e) => {
            error!("Failed to update portfolio item {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn delete(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    RequireUser(user): RequireUser,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let id = item_id(&raw_id, uri.path())?;
    svc.items
        .delete(user.id, id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    views::flash(&session, FlashLevel::Info, "flash_item_deleted");
    Ok(views::see_other("/profile"))
}
