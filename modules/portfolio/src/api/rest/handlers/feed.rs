use std::sync::Arc;

use axum::{extract::Query, http::Uri, response::Response, Extension};
use hubkit::{ProblemResponse, Session};
use tracing::error;

use crate::api::rest::dto::{FeedQuery, FeedView};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::MaybeUser;
use crate::api::rest::views;
use crate::contract::model::FeedFilter;
use crate::module::Services;

/// Public feed with optional `q`, `category` and `page`.
pub async fn index(
    Extension(svc): Extension<Arc<Services>>,
    session: Session,
    MaybeUser(user): MaybeUser,
    Query(query): Query<FeedQuery>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let page_no = query.page_number();
    let q = query.q.as_deref().unwrap_or_default().trim().to_string();
    let category = query.category.as_deref().unwrap_or_default().trim().to_string();

    let filter = FeedFilter {
        query: Some(q.clone()),
        category: Some(category.clone()),
    };
    let page = svc.feed.list_public(filter, page_no).await.map_err(|e| {
        error!("Failed to load feed: {}", e);
        map_domain_error(&e, uri.path())
    })?;
    let categories = svc.feed.categories().await.map_err(|e| {
        error!("Failed to load categories: {}", e);
        map_domain_error(&e, uri.path())
    })?;

    let view = FeedView::new(&page, q, category, categories);
    Ok(views::render(&session, user.as_ref(), view))
}
