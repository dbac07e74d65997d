//! HTTP host for the visitcount server.
//!
//! Wraps module routers with the shared middleware stack (request ids, tracing,
//! timeouts, CORS, body limits), adds `/health`, the optional OpenAPI endpoints
//! and a Problem-shaped 404, then serves the result until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware::from_fn, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::OpenApi;

pub mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

pub const HEALTH_PATH: &str = "/health";
pub const OPENAPI_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

/// Main API Ingress host
#[derive(Clone, Debug, Default)]
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Final router: module routes plus host endpoints, wrapped in the middleware stack.
    ///
    /// `openapi` is only served when `enable_docs` is set.
    pub fn build_router(&self, app: Router, openapi: Option<OpenApi>) -> Router {
        let mut router = app.route(HEALTH_PATH, get(web::health_check));

        if self.config.enable_docs {
            if let Some(doc) = openapi {
                let doc = Arc::new(doc);
                router = router
                    .route(
                        OPENAPI_PATH,
                        get(move || {
                            let doc = Arc::clone(&doc);
                            async move { Json(doc.as_ref().clone()) }
                        }),
                    )
                    .route(DOCS_PATH, get(web::serve_docs));
                tracing::debug!("API docs enabled at {} and {}", DOCS_PATH, OPENAPI_PATH);
            }
        }

        router = router.fallback(web::not_found_fallback);

        // Router::layer wraps everything added before it: innermost first.
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(request_id::header()))
            .layer(SetRequestIdLayer::new(
                request_id::header(),
                request_id::MakeReqId,
            ))
    }

    /// Bind `addr` and serve until `cancel` fires.
    pub async fn serve(
        &self,
        addr: &str,
        router: Router,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", addr, e))?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", addr);
        serve_on(listener, router, cancel).await
    }
}

/// Serve on an already bound listener. Handlers can extract `ConnectInfo<SocketAddr>`.
pub async fn serve_on(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
