//! Prices Server Library
//!
//! HTTP service that loads price lists from uploaded archives into
//! PostgreSQL and hands them back as a zipped CSV.
//!
//! # Overview
//!
//! - **Ingestion**: zip or tar archives of CSV files, validated row by row and
//!   written in a single transaction ([`ingest`])
//! - **Export**: every stored row as `data.csv` inside `data.zip`
//! - **Configuration**: environment-based, see [`config::Config`]
//! - **Middleware**: CORS and request tracing
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`], split into commands
//! (writes) and queries (reads). The ingestion engine in [`ingest`] has no
//! HTTP knowledge and can be driven directly from a file path.
//!
//! # Example
//!
//! ```no_run
//! use prices_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     api::serve(pool, config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

pub use error::AppError;
