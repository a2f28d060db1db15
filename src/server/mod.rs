//! Development server for previewing the rendered site

use anyhow::{Context, Result};
use axum::{handler::HandlerWithoutStateExt, http::StatusCode, Router};
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Site;

/// Build the static file router over `public_dir`
///
/// Directory requests resolve to their `index.html`; anything missing is 404.
pub fn router(public_dir: &Path) -> Router {
    let serve_dir = ServeDir::new(public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(not_found.into_service());

    Router::new()
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Serve the site's public directory until Ctrl+C
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    if !site.public_dir.is_dir() {
        tracing::warn!(
            "{:?} does not exist yet, every request will 404. Run `quill render` first.",
            site.public_dir
        );
    }

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", ip, port))?;

    let app = router(&site.public_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    println!("Server running at http://{}:{}/", ip, port);
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
