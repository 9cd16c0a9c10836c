use axum::{
    extract::Request,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::catalog::{DoubanClient, ShortVideoClient, UpstreamError};
use crate::config::{CacheTimeSource, ConfigStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub cache_time: Arc<dyn CacheTimeSource>,
    pub douban: Arc<DoubanClient>,
    pub short_video: Arc<ShortVideoClient>,
}

impl AppState {
    /// Build upstream clients from the current config. The config store also
    /// serves as the cache time source.
    pub fn new(config: Arc<ConfigStore>) -> Result<Self, UpstreamError> {
        let snapshot = config.get();
        let douban = Arc::new(DoubanClient::new(&snapshot.upstream.douban)?);
        let short_video = Arc::new(ShortVideoClient::new(&snapshot.upstream.short_video)?);

        Ok(Self {
            cache_time: config.clone(),
            config,
            douban,
            short_video,
        })
    }

    pub fn with_cache_time(mut self, cache_time: Arc<dyn CacheTimeSource>) -> Self {
        self.cache_time = cache_time;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/api/douban/categories",
            get(crate::catalog::get_categories),
        )
        .route("/health", get(health_handler))
        .route("/robots.txt", get(robots_txt_handler))
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::log_request,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // The path is rewritten before the inner router matches it.
    Router::new().fallback_service(
        axum::middleware::from_fn(crate::middleware::normalize_path).layer(routes),
    )
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, "no-cache, no-store")],
        "Healthy",
    )
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    // CORS preflight for paths without a route
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
