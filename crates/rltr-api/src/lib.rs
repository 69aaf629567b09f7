//! RLTR listing API
//!
//! Read-only HTTP access to the seeded record catalog. Each collection is listed with
//! the same query parameters its dashboard screen produces: `q` for free text, one
//! parameter per dropdown, `min_<field>`/`max_<field>` for ranges, and `limit`/`offset`
//! for paging.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use rltr_core::{Catalog, PageLimits, RltrError, RltrResult};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

pub mod config;
pub mod error;
pub mod handlers;
pub mod tracing_setup;

use config::RltrConfig;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared, read-only state handed to every handler
#[derive(Debug)]
pub struct AppState {
    pub catalog: Catalog,
    pub page_limits: PageLimits,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(catalog: Catalog, page_limits: PageLimits) -> Self {
        Self { catalog, page_limits, start_time: Utc::now() }
    }

    pub fn uptime(&self) -> Duration {
        Utc::now() - self.start_time
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string()).ok().map(RequestId::new)
    }
}

/// Build the application router over a seeded catalog
pub fn create_app(catalog: Catalog, config: &RltrConfig) -> RltrResult<Router> {
    let state = Arc::new(AppState::new(catalog, config.page_limits()));
    info!(
        collections = state.catalog.len(),
        api_prefix = %config.server.api_prefix,
        "Creating listing API router"
    );

    let api = Router::new()
        .route("/health/live", get(handlers::live))
        .route("/health/ready", get(handlers::ready))
        .route("/collections", get(handlers::list_collections))
        .route("/{collection}", get(handlers::list_records))
        .route("/{collection}/{id}", get(handlers::get_record))
        .with_state(state);

    let prefix = config.server.api_prefix.trim_end_matches('/');
    let router = if prefix.is_empty() { api } else { Router::new().nest(prefix, api) };

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), UuidRequestId))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
            )
        }))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(cors_layer(&config.server.cors_origins)?);

    Ok(router.layer(middleware))
}

fn cors_layer(origins: &[String]) -> RltrResult<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| {
                RltrError::configuration(
                    format!("invalid CORS origin '{origin}'"),
                    Some("server.cors_origins"),
                )
            })
        })
        .collect::<RltrResult<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any))
}
