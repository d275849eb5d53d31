//! HTTP surface
//!
//! `/health` lives here; everything under `/api/v0` comes from the feature
//! slices.

pub mod response;

use crate::config::Config;
use crate::error::AppError;
use crate::{db, features, middleware};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use response::HealthResponse;
use sqlx::PgPool;
use std::{future::IntoFuture, net::SocketAddr, time::Duration};
use tokio::{signal, sync::oneshot};
use tracing::{info, warn};

/// Build the application router with all routes and middleware
pub fn create_router(pool: PgPool, config: &Config) -> Router {
    let feature_routes = features::router(features::FeatureState { db: pool.clone() });

    Router::new()
        .route("/health", get(health))
        .with_state(pool)
        .nest("/api/v0", feature_routes)
        .layer(DefaultBodyLimit::max(config.server.upload_limit_bytes))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Bind and serve until SIGINT or SIGTERM
///
/// In-flight requests get `shutdown_timeout_secs` to finish once a signal
/// arrives; whatever is still open after that is dropped.
pub async fn serve(pool: PgPool, config: Config) -> anyhow::Result<()> {
    let app = create_router(pool, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let deadline = async move {
        if signalled_rx.await.is_ok() {
            info!("Waiting up to {} seconds for connections to close", grace.as_secs());
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result?;
            info!("Server shut down gracefully");
        },
        _ = deadline => {
            warn!("Shutdown timeout elapsed, dropping open connections");
        },
    }

    Ok(())
}

async fn health(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    db::health_check(&pool).await?;

    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            database: "connected".to_string(),
        }),
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
