//! HTTP surface built on axum.
//!
//! Public routes (health, generate, strength, validate) need no caller.
//! Credential routes sit behind the bearer middleware, which resolves the
//! caller before any handler or store code runs.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::IdentityProvider;
use crate::errors::{Result, VaultError};
use crate::service::VaultService;

use self::auth::auth_middleware;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VaultService>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Listener and CORS configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| VaultError::Config(format!("invalid CORS origin: {origin}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/passwords/generate", post(handlers::generate_password))
        .route("/api/passwords/strength", post(handlers::check_strength))
        .route("/api/passwords/validate", post(handlers::validate_password))
        .with_state(state.clone());

    let credential_routes = Router::new()
        .route(
            "/api/passwords",
            get(handlers::list_credentials).post(handlers::create_credential),
        )
        .route(
            "/api/passwords/{id}",
            get(handlers::reveal_credential)
                .put(handlers::update_credential)
                .delete(handlers::delete_credential),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Ok(Router::new()
        .merge(public_routes)
        .merge(credential_routes)
        .fallback(handlers::not_found)
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// Bind and serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = router(state, &config.allowed_origins)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VaultError::Config(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("credential vault listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
