//! HTTP request boundary
//!
//! Validates inbound requests, decodes images, applies the per-client rate
//! limit and turns generator failures into opaque error responses.

mod handlers;
pub mod requests;
pub mod response;

pub use response::{ApiError, ApiResult};

use crate::ai::ModelAdapter;
use crate::config::Config;
use crate::lessons::Lessons;
use crate::media::MediaPolicy;
use crate::ratelimit::RateLimiter;
use crate::Result;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{header, HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const PROCESS_TIME: HeaderName = HeaderName::from_static("x-process-time");

#[derive(Clone)]
pub struct AppState {
    pub lessons: Lessons,
    pub media: Arc<MediaPolicy>,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(lessons: Lessons, media: MediaPolicy, limiter: RateLimiter) -> Self {
        Self {
            lessons,
            media: Arc::new(media),
            limiter,
        }
    }

    pub fn from_config(config: &Config, adapter: Arc<dyn ModelAdapter>) -> Result<Self> {
        Ok(Self::new(
            Lessons::new(adapter),
            MediaPolicy::new(
                config.supported_image_types.clone(),
                config.max_image_size_mb,
            ),
            RateLimiter::new(config.rate_limit_per_minute)?,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.media.body_limit();

    let lessons = Router::new()
        .route("/terms", post(handlers::terms))
        .route("/grammar", post(handlers::grammar))
        .route("/conversation", post(handlers::conversation))
        .route("/object-descriptors", post(handlers::object_descriptors))
        .route("/detect-objects", post(handlers::detect_objects))
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit,
        ));

    Router::new()
        .route("/", get(handlers::health))
        .merge(lessons)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Clients are told apart by their User-Agent.
fn client_id(request: &Request) -> &str {
    request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    limiter.check(client_id(&request))?;
    Ok(next.run(request).await)
}

async fn process_time(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64().to_string();
    if let Ok(value) = HeaderValue::from_str(&elapsed) {
        response.headers_mut().insert(PROCESS_TIME, value);
    }
    response
}
