//! Snipspace API Server Entry Point
//!
//! Reads configuration, selects the content store and starts the Axum HTTP
//! server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use snipspace_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig, DbConfig, PgStore,
    SharedStore, StoreBackend,
};
use snipspace_storage::InMemoryStore;

use snipspace_api::telemetry::{init_tracer, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env().map_err(|e| ApiError::invalid_input(e.to_string()))?;
    let auth_config = AuthConfig::from_env();

    let store = open_store(api_config.store_backend).await?;
    let app: Router = create_api_router(AppState::new(store), &api_config, auth_config)?;

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, backend = ?api_config.store_backend, "Starting Snipspace API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn open_store(backend: StoreBackend) -> ApiResult<SharedStore> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; content is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgStore::from_config(&DbConfig::from_env())?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
    }
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("SNIPSPACE_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("SNIPSPACE_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
