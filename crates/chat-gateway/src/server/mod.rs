//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::protocol::CloseCode;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chat_common::{AppConfig, AppError, CorsConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub connections: usize,
    pub online_users: usize,
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Server is running",
        timestamp: Utc::now(),
        connections: state.connection_manager().connection_count(),
        online_users: state.presence().len(),
    })
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    let config = state.config();
    let cors = create_cors_layer(&config.cors, config.app.env.is_production());

    create_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create CORS layer from configuration
///
/// Any origin is allowed unless origins are configured.
fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if config.allowed_origins.is_empty() {
        if is_production {
            tracing::warn!("CORS: No origins configured, allowing any origin in production");
        }
        return base_layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS: Allowing {} configured origins", origins.len());
    base_layer.allow_origin(AllowOrigin::list(origins))
}

/// Run the gateway server until Ctrl-C / SIGTERM
///
/// On shutdown every open connection is sent a Going Away close frame.
pub async fn run_server(listener: TcpListener, state: GatewayState) -> Result<(), AppError> {
    let app = create_app(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(AppError::Server)
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.gateway.address();
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid gateway address {address}: {e}")))?;

    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::bind(addr, e))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    run_server(listener, GatewayState::new(config)).await
}

async fn shutdown_signal(state: GatewayState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    state.connection_manager().close_all(CloseCode::GoingAway);
}
