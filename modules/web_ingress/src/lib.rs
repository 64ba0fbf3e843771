//! HTTP front door for PortfoHub.
//!
//! Wraps the application router with the cross-cutting layers and runs the
//! server until cancelled. Layer order, outermost first:
//!
//! PropagateRequestId → SetRequestId → Trace → push_req_id_to_extensions →
//! Timeout → CORS → RequestBodyLimit → DefaultBodyLimit → session → CSRF

pub mod config;
pub mod request_id;
pub mod web;

pub use config::WebIngressConfig;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use hubkit::{
    csrf::{csrf_guard, CsrfConfig},
    session::session_layer,
    SessionConfig,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;

pub struct WebIngress {
    config: WebIngressConfig,
    session: Arc<SessionConfig>,
}

impl WebIngress {
    pub fn new(config: WebIngressConfig, session: SessionConfig) -> Self {
        Self {
            config,
            session: Arc::new(session),
        }
    }

    /// Add `/health`, the 404 fallback and all ingress layers around `app`.
    pub fn build_router(&self, app: Router) -> Router {
        let max_body = self.config.max_body_bytes;
        let x_request_id = request_id::header();

        let mut router = app
            .route("/health", get(web::health_check))
            .fallback(web::not_found)
            .layer(from_fn_with_state(
                CsrfConfig {
                    max_body_bytes: max_body,
                },
                csrf_guard,
            ))
            .layer(from_fn_with_state(self.session.clone(), session_layer))
            .layer(DefaultBodyLimit::max(max_body))
            .layer(RequestBodyLimitLayer::new(max_body));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        if self.config.timeout_sec > 0 {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(
                self.config.timeout_sec,
            )));
        }

        let trace = TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(hubkit::REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");
                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    module = "web_ingress",
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty
                )
            })
            .on_response(
                |resp: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    span.record("status", resp.status().as_u16());
                    span.record("latency_ms", latency.as_millis() as u64);
                    tracing::debug!(parent: span, "response sent");
                },
            );

        router
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(trace)
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                request_id::MakeReqId,
            ))
            .layer(PropagateRequestIdLayer::new(x_request_id))
    }

    /// Bind and serve until `cancel` fires, then drain in-flight requests.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.config.bind_addr))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!(%addr, "HTTP server bound");

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
