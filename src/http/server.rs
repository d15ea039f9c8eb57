//! HTTP engine setup and request dispatch.
//!
//! # Responsibilities
//! - Collect routes and their handlers during startup
//! - Freeze them into a shared route table
//! - Build the Axum app with middleware (request ID, tracing, timeout)
//! - Dispatch every request through the route table
//! - Serve until shutdown is triggered

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::Response,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EngineConfig;
use crate::http::context::Context;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::http::response;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{RouteError, Router, SharedRouter};

/// A request handler.
pub type Handler = Arc<dyn Fn(Context) -> Response + Send + Sync>;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SharedRouter<Handler>>,
    pub max_body_size: usize,
}

/// Route registry plus the HTTP server around it.
pub struct Engine {
    router: Router<Handler>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    /// Register `handler` for `method` and `pattern`.
    pub fn add_route<F>(&mut self, method: &str, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(Context) -> Response + Send + Sync + 'static,
    {
        self.router.register(method, pattern, Arc::new(handler))
    }

    pub fn get<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(Context) -> Response + Send + Sync + 'static,
    {
        self.add_route("GET", pattern, handler)
    }

    pub fn post<F>(&mut self, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(Context) -> Response + Send + Sync + 'static,
    {
        self.add_route("POST", pattern, handler)
    }

    /// Routes registered so far.
    pub fn router(&self) -> &Router<Handler> {
        &self.router
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Freeze the routes and build the Axum app.
    ///
    /// The returned table still accepts registrations; the app sees them on the
    /// next request.
    pub fn into_app(self) -> (axum::Router, Arc<SharedRouter<Handler>>) {
        let shared = Arc::new(SharedRouter::new(self.router));
        let state = AppState {
            router: shared.clone(),
            max_body_size: self.config.listener.max_body_size,
        };
        (build_app(&self.config, state), shared)
    }

    /// Serve on `listener` until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let (app, _) = self.into_app();
        serve(listener, app, shutdown).await
    }
}

/// Build the Axum app with all middleware layers.
#[allow(deprecated)]
fn build_app(config: &EngineConfig, state: AppState) -> axum::Router {
    axum::Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
}

/// Serve `app` on `listener` with graceful shutdown.
pub async fn serve(listener: TcpListener, app: axum::Router, shutdown: Shutdown) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.signalled())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Resolve the request and run its handler.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let router = state.router.snapshot();
    let (handler, pattern, params) = match router.resolve(method.as_str(), &path) {
        Ok(found) => (found.handler.clone(), found.pattern.to_string(), found.params),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "No route matched");
            metrics::record_request(method.as_str(), 404, start_time);
            return response::not_found(&path);
        }
    };

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Request body rejected");
            metrics::record_request(method.as_str(), 413, start_time);
            return response::text(StatusCode::PAYLOAD_TOO_LARGE, "request body too large");
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        pattern = %pattern,
        "Dispatching request"
    );

    let response = handler(Context::new(parts, pattern, params, body));
    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn engine() -> Engine {
        let mut engine = Engine::new(EngineConfig::default());
        engine
            .get("/hello/:name", |c: Context| {
                response::text(
                    StatusCode::OK,
                    format!("hello {}, you're at {}", c.param("name").unwrap_or_default(), c.path()),
                )
            })
            .unwrap();
        engine
            .post("/echo", |c: Context| response::data(StatusCode::OK, c.body().clone()))
            .unwrap();
        engine
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_to_handler() {
        let (app, _) = engine().into_app();
        let (status, body) = send(&app, get("/hello/geek")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello geek, you're at /hello/geek");
    }

    #[tokio::test]
    async fn test_unmatched_path_is_404() {
        let (app, _) = engine().into_app();
        let (status, body) = send(&app, get("/hello")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "404 NOT FOUND: /hello\n");

        let request = Request::builder()
            .method("DELETE")
            .uri("/hello/geek")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_is_set_and_propagated() {
        let (app, _) = engine().into_app();

        let response = app.clone().oneshot(get("/hello/a")).await.unwrap();
        let id = response.headers()[X_REQUEST_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());

        let request = Request::builder()
            .uri("/missing")
            .header(X_REQUEST_ID, "given-id")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "given-id");
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = EngineConfig::default();
        config.listener.max_body_size = 4;
        let mut engine = engine();
        engine.config = config;
        let (app, _) = engine.into_app();

        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Body::from("ok"))
            .unwrap();
        assert_eq!(send(&app, request).await, (StatusCode::OK, "ok".to_string()));

        let request = Request::builder()
            .method("POST")
            .uri("/echo")
            .body(Body::from("far too long"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_late_registration_is_visible() {
        let (app, routes) = engine().into_app();
        assert_eq!(send(&app, get("/late")).await.0, StatusCode::NOT_FOUND);

        let handler: Handler = Arc::new(|_: Context| response::text(StatusCode::OK, "late"));
        routes.register("GET", "/late", handler).unwrap();
        assert_eq!(send(&app, get("/late")).await, (StatusCode::OK, "late".to_string()));
    }
}
