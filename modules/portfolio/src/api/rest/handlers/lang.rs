use axum::{
    extract::Path,
    http::{header, HeaderMap},
    response::Response,
};
use hubkit::Session;

use crate::api::rest::views;
use crate::i18n;

/// Store the language choice and go back where the user came from.
pub async fn set_lang(session: Session, Path(code): Path<String>, headers: HeaderMap) -> Response {
    session.set_lang(i18n::resolve_lang(Some(&code)));
    let back = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("/");
    views::see_other(back)
}
