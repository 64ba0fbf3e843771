use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::services::ServeDir;

use crate::api::rest::dto::UPLOADS_PREFIX;
use crate::api::rest::handlers::{auth, feed, lang, portfolio, profile};
use crate::module::Services;

/// Mount every page of the site plus the upload folder on `router`.
pub fn register_routes(router: Router, services: Arc<Services>, upload_dir: &Path) -> Router {
    router
        .route("/", get(feed::index))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/profile", get(profile::own))
        .route("/u/{username}", get(profile::public))
        .route(
            "/settings",
            get(profile::settings_form).post(profile::update_settings),
        )
        .route(
            "/portfolio/new",
            get(portfolio::new_form).post(portfolio::create),
        )
        .route(
            "/portfolio/{id}/edit",
            get(portfolio::edit_form).post(portfolio::update),
        )
        .route("/portfolio/{id}/delete", post(portfolio::delete))
        .route("/set-lang/{code}", get(lang::set_lang))
        .nest_service(UPLOADS_PREFIX, ServeDir::new(upload_dir))
        .layer(Extension(services))
}
