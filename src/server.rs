//! Server initialization and routing
//!
//! Router assembly with the auth gate on protected routes, global
//! middleware stack, best-effort startup initialization (bucket + demo
//! account), and graceful shutdown handling.

use crate::config::ServerConfig;
use crate::middleware::{bearer_auth, log_requests, request_id};
use crate::routes::{analyze, api_info, health, not_found, scans, upload, users};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Fixed service identifier segment prefixing every route.
pub const SERVICE_PREFIX: &str = "/dermascan";

/// Build the Axum router with all routes and middleware.
///
/// Routes are divided into:
/// - Public: /, /health, /signup (no auth)
/// - Protected: profile, upload, analyze, scans (bearer token required)
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/signup", post(users::signup));

    let protected_routes = Router::new()
        .route("/user/{user_id}", get(users::get_profile))
        .route("/user/{user_id}", put(users::update_profile))
        .route("/upload-image", post(upload::upload_image))
        .route("/analyze", post(analyze::analyze))
        // One path, two meanings: GET takes a user id, DELETE a scan id.
        .route("/scans/{id}", get(scans::list_scans))
        .route("/scans/{id}", delete(scans::delete_scan))
        .layer(from_fn_with_state(state.clone(), bearer_auth));

    let service = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .route("/", get(api_info))
        .nest(SERVICE_PREFIX, service)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(request_id))
        .layer(from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the DermaScan HTTP server.
///
/// Initializes structured logging, shared state, and startup side effects
/// (storage bucket, optional demo account), then serves until SIGTERM or
/// Ctrl+C.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    // Logged here rather than in ServerConfig::load so the subscriber is up.
    if config.identity.service_key.is_empty() {
        tracing::warn!(
            "No identity service key configured; identity provider calls will be rejected"
        );
    }

    let state = Arc::new(ServerState::new(config.clone())?);

    init_storage(&state).await;
    if state.config.seed_demo_account {
        init_demo_account(&state).await;
    }

    let app = build_router(state);
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!("Starting DermaScan server on {}", addr);
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, CORS: {}",
        config.timeout_secs,
        config.max_body_size_mb,
        config.enable_cors
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Ensure the scan bucket exists. Best-effort: failure is logged, not fatal.
async fn init_storage(state: &ServerState) {
    match state
        .storage
        .ensure_bucket(state.config.max_body_size())
        .await
    {
        Ok(()) => tracing::info!(bucket = %state.config.storage.bucket, "Storage bucket ready"),
        Err(err) => tracing::error!(error = %err, "Error initializing storage"),
    }
}

/// Seed the demo account if it does not exist yet. Best-effort.
async fn init_demo_account(state: &ServerState) {
    const DEMO_EMAIL: &str = "demo@skincare.ai";
    const DEMO_PASSWORD: &str = "demo123456";
    const DEMO_NAME: &str = "Demo User";

    match state
        .identity
        .create_user(DEMO_EMAIL, DEMO_PASSWORD, DEMO_NAME)
        .await
    {
        Ok(user) => {
            let profile = crate::models::UserProfile {
                id: user.id.clone(),
                email: DEMO_EMAIL.to_string(),
                name: DEMO_NAME.to_string(),
                created_at: Utc::now(),
                updated_at: None,
            };
            if let Err(err) = state
                .kv
                .set(&crate::models::user_key(&user.id), &profile)
                .await
            {
                tracing::error!(error = %err, "Failed to store demo profile");
            } else {
                tracing::info!("Demo account created: {DEMO_EMAIL}");
            }
        }
        // Most commonly an already-exists rejection from the provider.
        Err(err) => tracing::info!(error = %err, "Demo account not created"),
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
