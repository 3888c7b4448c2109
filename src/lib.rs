//! Notes is a small multi-tenant note service.
//!
//! Users own notes, and a note can only be read, changed or deleted
//! through the user who created it.
#![forbid(unsafe_code)]

pub mod config;
pub mod database;
pub mod error;
pub mod model;
mod router;
pub mod server;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use crate::config::Configuration;
use crate::database::Database;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
#[cfg(test)]
pub async fn json_body(
    response: axum::http::Response<axum::body::Body>,
) -> serde_json::Value {
    use http_body_util::BodyExt;

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub db: Database,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    Router::new()
        // `GET /` is a welcome message, `POST /` creates a user.
        .route("/", get(router::status::handler).post(router::users::create))
        // `GET /users` lists users; as a literal it is matched before `/{user}`.
        .route(
            "/users",
            get(router::users::list).post(router::notes::create_for_users_segment),
        )
        // `GET /{user}` lists (or searches) notes, `POST /{user}` adds one.
        .route("/{user}", get(router::notes::list).post(router::notes::create))
        .route(
            "/{user}/{note_id}",
            get(router::note::get)
                .put(router::note::update)
                .delete(router::note::delete),
        )
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
///
/// The store is connected lazily; a failed first attempt is only logged so
/// the service can come up before its database.
pub async fn initialize_state(config: Arc<Configuration>) -> AppState {
    let db = match config.postgres {
        Some(ref postgres) => Database::postgres(postgres.url(), postgres.pool_size()),
        None => {
            tracing::warn!(
                "missing `postgres` entry on `config.yaml` file, notes are kept in memory"
            );
            Database::memory()
        },
    };

    if let Err(err) = db.connect().await {
        tracing::error!(error = %err, "store unreachable, retrying on next request");
    }

    AppState { config, db }
}
