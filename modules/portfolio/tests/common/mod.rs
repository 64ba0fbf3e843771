#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use hub_db::{ConnectOpts, DbHandle};
use portfolio::config::PasswordConfig;
use portfolio::contract::model::{PortfolioDraft, Registration, User, Visibility};
use portfolio::{PortfolioConfig, PortfolioModule, Services};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use web_ingress::{WebIngress, WebIngressConfig};

pub const PASSWORD: &str = "secret1";

pub struct TestApp {
    pub router: Router,
    pub services: Arc<Services>,
    pub db: DbHandle,
    pub uploads: TempDir,
}

/// In-memory database with migrations, temp upload dir, full ingress stack.
pub async fn spawn_app() -> TestApp {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("in-memory sqlite");
    PortfolioModule::migrate(&db).await.expect("migrations");

    let uploads = tempfile::tempdir().expect("temp dir");
    let config = PortfolioConfig {
        password: PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..PortfolioConfig::default()
    };
    let max_body = config.max_upload_bytes;
    let module = PortfolioModule::init(config, db.sea(), uploads.path().to_path_buf())
        .await
        .expect("module init");

    let ingress = WebIngress::new(
        WebIngressConfig {
            max_body_bytes: max_body,
            ..WebIngressConfig::default()
        },
        module.session_config().expect("session config"),
    );
    let router = ingress.build_router(module.router(Router::new()));

    TestApp {
        router,
        services: module.services(),
        db,
        uploads,
    }
}

impl TestApp {
    pub async fn register(&self, full_name: &str, username: &str) -> User {
        self.services
            .auth
            .register(Registration {
                full_name: full_name.into(),
                username: username.into(),
                email: format!("{username}@example.com"),
                password: PASSWORD.into(),
                confirm_password: PASSWORD.into(),
            })
            .await
            .expect("registration")
    }

    pub async fn add_item(&self, owner: i64, title: &str, visibility: Visibility) -> i64 {
        self.services
            .items
            .create(
                owner,
                PortfolioDraft {
                    title: title.into(),
                    visibility,
                    ..Default::default()
                },
                None,
            )
            .await
            .expect("create item")
            .id
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.db.sqlx_sqlite())
            .await
            .expect("count")
    }

    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookie: None,
            token: None,
        }
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn set_cookie(&self) -> String {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    /// Flash messages of a rendered page.
    pub fn flashes(&self) -> Vec<String> {
        self.json()["context"]["flashes"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|f| f["message"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Cookie-keeping client that sends the CSRF token with every POST.
pub struct Browser {
    router: Router,
    cookie: Option<String>,
    token: Option<String>,
}

impl Browser {
    pub async fn send(&mut self, mut req: Request<Body>) -> Reply {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().expect("cookie header"));
        }
        let resp = self.router.clone().oneshot(req).await.expect("response");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = to_bytes(resp.into_body(), usize::MAX).await.expect("body");

        if let Some(set) = headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()) {
            let pair = set.split(';').next().unwrap_or_default().to_string();
            self.cookie = Some(pair);
        }
        let reply = Reply {
            status,
            headers,
            body,
        };
        if let Ok(v) = serde_json::from_slice::<Value>(&reply.body) {
            if let Some(t) = v["context"]["csrf_token"].as_str() {
                self.token = Some(t.to_string());
            }
        }
        reply
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Current CSRF token. When none is known the feed is rendered to get
    /// one, which consumes pending flashes.
    pub async fn token(&mut self) -> String {
        if self.token.is_none() {
            self.get("/").await;
        }
        self.token.clone().expect("csrf token")
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Reply {
        let token = self.token().await;
        let mut body = url::form_urlencoded::Serializer::new(String::new());
        body.append_pair("csrf_token", &token);
        for (k, v) in fields {
            body.append_pair(k, v);
        }
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.finish()))
            .unwrap();
        self.send(req).await
    }

    pub async fn post_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Reply {
        let token = self.token().await;
        let boundary = "----portfohub-test-boundary";
        let mut body = Vec::new();
        let text = |name: &str, value: &str, body: &mut Vec<u8>| {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        };
        text("csrf_token", &token, &mut body);
        for (k, v) in fields {
            text(k, v, &mut body);
        }
        for (field, file_name, content) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let req = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Log in and forget the pre-login token; the session issues a new one.
    pub async fn login(&mut self, username: &str, remember: bool) -> Reply {
        let mut fields = vec![("username", username), ("password", PASSWORD)];
        if remember {
            fields.push(("remember", "on"));
        }
        let reply = self.post_form("/login", &fields).await;
        if reply.status == StatusCode::SEE_OTHER {
            self.token = None;
        }
        reply
    }

    pub async fn logout(&mut self) -> Reply {
        let reply = self.get("/logout").await;
        self.token = None;
        reply
    }
}
