//! Feature modules implementing the prices API
//!
//! Each feature is a vertical slice with its own commands, queries and routes.
//!
//! # Features
//!
//! - **prices**: archive upload (ingestion) and zipped CSV export
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions and error mapping

pub mod prices;

use axum::Router;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
}

/// Creates the versioned API router with all feature routes mounted
///
/// - `/prices` - upload and export
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/prices", prices::prices_routes().with_state(state.db))
}
