//! Prices Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging setup, and error handling for the price service.
//!
//! # Overview
//!
//! - **Error Handling**: [`PricesError`] and its result alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]
//! - **Types**: [`types::PriceRecord`] and [`types::ArchiveKind`]
//!
//! # Example
//!
//! ```no_run
//! use prices_common::logging::{init_logging, LogConfig};
//! use prices_common::types::ArchiveKind;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     let kind: ArchiveKind = "tar".parse()?;
//!     tracing::info!(%kind, "Archive kind selected");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

pub use error::{PricesError, Result};
pub use types::{ArchiveKind, PriceRecord};
