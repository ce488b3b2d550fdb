//! HTTP interface — Axum JSON API over the ledger core.
//!
//! The core stays interface-agnostic; this layer only parses inputs,
//! calls ledger operations, and maps results to JSON and status codes.
//! CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tracing::info;

pub use routes::{AppState, SharedState};
use tower_http::cors::CorsLayer;

/// Serve the API until shutdown. Binds the port, then runs the router.
pub async fn serve(state: SharedState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "API server starting on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("API server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/register", post(routes::register))
        .route("/api/login", post(routes::login))
        .route("/api/users/:username/bets", post(routes::place_bet))
        .route("/api/users/:username/bets", get(routes::list_bets))
        .route("/api/users/:username/parlays", post(routes::place_parlay))
        .route(
            "/api/users/:username/bets/:id/resolve",
            post(routes::resolve_bet),
        )
        .route("/api/users/:username/bets/:id", delete(routes::delete_bet))
        .route("/api/users/:username/deposit", post(routes::deposit))
        .route("/api/users/:username/withdraw", post(routes::withdraw))
        .route("/api/users/:username/balance", get(routes::balance))
        .route(
            "/api/users/:username/transactions",
            get(routes::transactions),
        )
        .route("/api/users/:username/report", get(routes::report))
        .route("/api/users/:username/export", post(routes::export))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
