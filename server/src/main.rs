//! Trolley Server - cart sync backend for the Trolley storefront.
//!
//! This server persists one cart per account and exposes HTTP and WebSocket
//! endpoints for storefront clients to fetch, store, and reconcile their
//! session cart against it using the trolley-engine merge logic.

mod auth;
mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod routes;
mod websocket;

use crate::cache::CartCache;
use crate::config::Config;
use crate::db::Pool;
use crate::websocket::ConnectionManager;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub config: Arc<Config>,
    pub conn_manager: Arc<ConnectionManager>,
    pub cart_cache: Arc<CartCache>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trolley_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Trolley Server on {}:{}", config.host, config.port);

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    // Build application state
    let conn_manager = ConnectionManager::new_shared();
    let cart_cache = Arc::new(CartCache::new(config.cart_cache_ttl_ms));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        conn_manager,
        cart_cache,
    };

    // Evict expired cart cache entries in the background
    let purge_cache = state.cart_cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            let now = chrono::Utc::now().timestamp_millis() as u64;
            let removed = purge_cache.purge_expired(now);
            if removed > 0 {
                tracing::debug!(removed, "Purged expired cart cache entries");
            }
        }
    });

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
