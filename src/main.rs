// src/main.rs
mod database;
mod dtos;
mod error;
mod handlers;
mod metrics;
mod models;
mod routes;
mod state;
mod store;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{routing::get, Router};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::fmt::init as tracing_init;

use crate::store::{MemoryProductStore, PgProductStore, ProductStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_init();

    // Load environment variables
    dotenv().ok();

    // Create store handle; without DATABASE_URL the service runs on a
    // volatile in-memory store (local development only)
    let store: Arc<dyn ProductStore> = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let db_pool = database::create_pool(&database_url)
                .await
                .expect("Failed to create database pool");
            database::ensure_schema(&db_pool)
                .await
                .expect("Failed to ensure products table");
            Arc::new(PgProductStore::new(db_pool))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; products will not survive a restart");
            Arc::new(MemoryProductStore::new())
        }
    };

    // Prometheus exposition is optional; counters no-op without it
    if let Some(addr) = std::env::var("METRICS_ADDR")
        .ok()
        .and_then(|a| a.parse::<SocketAddr>().ok())
    {
        metrics::init_exporter(addr);
    }

    // Create application state
    let app_state = state::AppState::new(store, metrics::Metrics::new());

    // Frontend calls from any origin; auth lives in the gateway
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router())
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(app_state);

    // Start server with HOST/PORT env and graceful port selection
    let host_str = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let host: IpAddr = host_str
        .parse()
        .unwrap_or_else(|_| "127.0.0.1".parse().unwrap());
    let base_port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    // Try base_port..base_port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = base_port.saturating_add(offset);
            let addr = SocketAddr::from((host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => {
                    bound = Some((l, addr));
                    break;
                }
                Err(e) => {
                    if offset == 0 {
                        tracing::warn!(%addr, error=%e, "Port in use, trying next");
                    }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!(
                    "Failed to bind to any port starting at {} on {}",
                    base_port,
                    host
                );
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}

async fn health_check() -> &'static str {
    "OK"
}
