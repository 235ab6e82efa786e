use crate::config::Config;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use filmradar_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_api;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Database connection pool
    pub pool: DbPool,
    pub pipeline: Arc<Pipeline>,
    /// Held for the duration of a harvest run so only one runs at a time.
    pub run_guard: Arc<tokio::sync::Mutex<()>>,
}

impl AppContext {
    pub fn new(config: Config, pool: DbPool, pipeline: Arc<Pipeline>) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            pipeline,
            run_guard: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes_api::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check(
    axum::extract::State(ctx): axum::extract::State<AppContext>,
) -> impl IntoResponse {
    let movies = filmradar_db::pool::get_conn(&ctx.pool)
        .and_then(|conn| filmradar_db::queries::movies::count_movies(&conn))
        .unwrap_or(-1);

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "movies": movies,
    }))
}

/// Start the HTTP server and serve until shutdown.
pub async fn start_server(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
