pub mod catalog;
pub mod config;
pub mod middleware;
pub mod server;
pub mod util;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Upstream client error: {0}")]
    Upstream(#[from] catalog::UpstreamError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: &str, debug_logs: bool) -> Result<(), ServerError> {
    let store = Arc::new(config::ConfigStore::load(config_path)?);
    store.set_debug_logs(debug_logs);
    let config = store.get();

    info!("Using config file: {}", config_path);
    info!("Cache max-age: {}s", config.cache.max_age);
    info!(
        "Douban upstream: {} (timeout {}s)",
        config.upstream.douban.base_url, config.upstream.douban.timeout
    );
    info!(
        "Short drama upstream: {} (timeout {}s)",
        config.upstream.short_video.base_url, config.upstream.short_video.timeout
    );
    if debug_logs {
        info!("Debug logging enabled");
    }

    store.clone().start_background_reload(config.cache.reload_interval);

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let state = server::AppState::new(store)?;
    let app = server::build_router(state);

    if let (Some(cert_path), Some(key_path)) = (&config.listen.tlscert, &config.listen.tlskey) {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}
