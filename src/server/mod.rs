mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::location::CoordinateIndex;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/exact", get(handlers::exact))
        .route("/api/locations", get(handlers::locations))
        .route("/api/estimate/duration", post(handlers::estimate_duration))
        .route("/api/estimate/details", post(handlers::estimate_details))
        .route("/api/estimate/delivery", post(handlers::estimate_delivery))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Build the index, bind `host:port` and serve until the process exits.
pub async fn start(index: CoordinateIndex, host: &str, port: u16) -> std::io::Result<()> {
    let entries = index.len();
    let app = build_router(AppState::new(index));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, entries, "freight-eta server listening");
    eprintln!("  Freight ETA server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
