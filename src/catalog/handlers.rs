use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use tracing::warn;

use super::params::{parse_route, CatalogRoute, ValidationError};
use super::types::{CatalogResponse, ErrorResponse};
use super::upstream::UpstreamError;
use crate::server::AppState;
use crate::util::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Douban,
    ShortVideo,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Douban => f.write_str("failed to fetch Douban data"),
            Provider::ShortVideo => f.write_str("failed to fetch short drama data"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{provider}: {source}")]
    Upstream {
        provider: Provider,
        source: UpstreamError,
    },
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            CatalogError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                    details: None,
                }),
            )
                .into_response(),
            CatalogError::Upstream { provider, source } => {
                warn!(error = %source, "{}", provider);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: provider.to_string(),
                        details: Some(source.to_string()),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// `GET /api/douban/categories`
pub async fn get_categories(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Response, CatalogError> {
    let route = parse_route(&params)?;

    let list = match route {
        CatalogRoute::ShortVideo(query) => state
            .short_video
            .video_list(&query)
            .await
            .map_err(|source| CatalogError::Upstream {
                provider: Provider::ShortVideo,
                source,
            })?,
        CatalogRoute::General(query) => state
            .douban
            .recent_hot(&query)
            .await
            .map_err(|source| CatalogError::Upstream {
                provider: Provider::Douban,
                source,
            })?,
    };

    let cache_time = state.cache_time.cache_seconds().await;

    Ok((
        [(header::CACHE_CONTROL, format!("public, max-age={}", cache_time))],
        Json(CatalogResponse::success(list)),
    )
        .into_response())
}
