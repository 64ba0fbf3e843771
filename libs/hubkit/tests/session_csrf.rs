use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use hubkit::{
    csrf::{csrf_guard, CsrfConfig},
    session::session_layer,
    FlashLevel, FormData, Session, SessionConfig,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

const MONTH: Duration = Duration::from_secs(30 * 24 * 3600);

fn app() -> Router {
    let session_cfg = Arc::new(SessionConfig::new("test-secret", MONTH).unwrap());
    Router::new()
        .route("/token", get(|s: Session| async move { s.csrf_token() }))
        .route(
            "/submit",
            post(|form: FormData| async move { form.trimmed("title") }),
        )
        .route(
            "/login",
            post(|s: Session, form: FormData| async move {
                s.login(7, form.checked("remember"));
                s.flash(FlashLevel::Success, "welcome");
                StatusCode::NO_CONTENT
            }),
        )
        .route(
            "/state",
            get(|s: Session| async move {
                let flashes = s.take_flashes();
                Json(json!({ "user_id": s.user_id(), "flashes": flashes }))
            }),
        )
        .layer(from_fn_with_state(
            CsrfConfig {
                max_body_bytes: 1024,
            },
            csrf_guard,
        ))
        .layer(from_fn_with_state(session_cfg, session_layer))
}

fn cookie_pair(resp: &axum::response::Response) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
}

fn set_cookie(resp: &axum::response::Response) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// GET /token and return (cookie, token).
async fn fetch_token(app: &Router) -> (String, String) {
    let resp = app
        .clone()
        .oneshot(Request::get("/token").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = cookie_pair(&resp).expect("session cookie");
    (cookie, body_text(resp).await)
}

fn form_post(uri: &str, cookie: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn form_token_passes_and_handler_sees_fields() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;

    let resp = app
        .clone()
        .oneshot(form_post(
            "/submit",
            &cookie,
            format!("csrf_token={token}&title=+Portfolio+"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Portfolio");
}

#[tokio::test]
async fn missing_or_wrong_token_is_rejected() {
    let app = app();
    let (cookie, _) = fetch_token(&app).await;

    for body in ["title=x".to_string(), "csrf_token=nope&title=x".to_string()] {
        let resp = app
            .clone()
            .oneshot(form_post("/submit", &cookie, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let problem: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(problem["code"], "CSRF_INVALID");
    }
}

#[tokio::test]
async fn post_without_session_is_rejected() {
    let resp = app()
        .oneshot(form_post("/submit", "", "csrf_token=&title=x".into()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn header_token_is_accepted() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;

    let req = Request::post("/submit")
        .header(header::COOKIE, &cookie)
        .header("X-CSRFToken", &token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title=via-header"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "via-header");
}

#[tokio::test]
async fn form_field_is_checked_before_header() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;

    let stale_header = form_post("/submit", &cookie, format!("csrf_token={token}&title=ok"));
    let (mut parts, body) = stale_header.into_parts();
    parts.headers.insert("x-csrftoken", "stale".parse().unwrap());
    let resp = app
        .clone()
        .oneshot(Request::from_parts(parts, body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");

    let req = Request::post("/submit")
        .header(header::COOKIE, &cookie)
        .header("X-CSRFToken", &token)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("csrf_token=stale&title=x"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_is_rejected_with_413() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;
    let body = format!("csrf_token={token}&title={}", "x".repeat(4096));

    let resp = app.oneshot(form_post("/submit", &cookie, body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn flashes_survive_one_redirect_and_are_consumed() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;

    let resp = app
        .clone()
        .oneshot(form_post(
            "/login",
            &cookie,
            format!("csrf_token={token}&remember=on"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(set_cookie(&resp).contains("Max-Age=2592000"));
    assert!(set_cookie(&resp).contains("HttpOnly"));
    let cookie = cookie_pair(&resp).unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::get("/state")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie_after = cookie_pair(&resp).unwrap();
    let state: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(state["user_id"], 7);
    assert_eq!(state["flashes"][0]["message"], "welcome");
    assert_eq!(state["flashes"][0]["level"], "success");

    let resp = app
        .oneshot(
            Request::get("/state")
                .header(header::COOKIE, &cookie_after)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let state: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(state["user_id"], 7);
    assert_eq!(state["flashes"], json!([]));
}

#[tokio::test]
async fn login_without_remember_sets_browser_session_cookie() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;

    let resp = app
        .oneshot(form_post("/login", &cookie, format!("csrf_token={token}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(!set_cookie(&resp).contains("Max-Age"));
}

#[tokio::test]
async fn tampered_cookie_yields_anonymous_session() {
    let app = app();
    let (cookie, token) = fetch_token(&app).await;
    let resp = app
        .clone()
        .oneshot(form_post("/login", &cookie, format!("csrf_token={token}")))
        .await
        .unwrap();
    let logged_in = cookie_pair(&resp).unwrap();

    let (name, value) = logged_in.split_once('=').unwrap();
    let (payload, _sig) = value.split_once('.').unwrap();
    let forged = format!("{name}={payload}.AAAA");

    let resp = app
        .oneshot(
            Request::get("/state")
                .header(header::COOKIE, forged)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let state: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(state["user_id"], Value::Null);
}
