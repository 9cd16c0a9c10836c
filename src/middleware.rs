use axum::{
    extract::{Request, State},
    http::uri::Uri,
    middleware::Next,
    response::Response,
};
use tracing::{debug, info};

use crate::server::AppState;

fn collapse_slashes(path: &str) -> String {
    let mut normalized = path.to_string();
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

/// Collapse repeated slashes in the request path. Must wrap the router rather
/// than be added with `Router::layer`, since routing has already happened by
/// the time a router layer runs.
pub async fn normalize_path(mut req: Request, next: Next) -> Response {
    let uri = req.uri();
    let path = uri.path();
    let normalized = collapse_slashes(path);

    if normalized != path {
        let mut parts = uri.clone().into_parts();
        let new_path_and_query = match uri.query() {
            Some(query) => format!("{}?{}", normalized, query),
            None => normalized,
        };

        if let Ok(new_uri) = new_path_and_query.parse::<Uri>() {
            parts.path_and_query = new_uri.into_parts().path_and_query;
            if let Ok(new_uri) = Uri::from_parts(parts) {
                *req.uri_mut() = new_uri;
            }
        }
    }

    next.run(req).await
}

pub async fn log_request(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    if state.config.get().debug_logs {
        let user_agent = req
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        debug!(method = %method, url = %uri, user_agent = user_agent, "Incoming request");
    }

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let content_length = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    info!(
        method = %method,
        url = %uri,
        status = status,
        length = content_length,
        "HTTP request"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_slashes() {
        assert_eq!(collapse_slashes("/api//douban/categories"), "/api/douban/categories");
        assert_eq!(collapse_slashes("///health"), "/health");
        assert_eq!(collapse_slashes("/robots.txt"), "/robots.txt");
    }
}
