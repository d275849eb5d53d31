//! Prices Server - Main entry point

use anyhow::Result;
use prices_common::logging::{init_logging, LogConfig};
use prices_server::{api, config::Config, db};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::default()
        .with_file_prefix("prices-server")
        .with_filter("prices_server=debug,tower_http=debug,sqlx=warn")
        .merge_env()?;

    // Keeps the file writer flushing until exit
    let _log_guard = init_logging(&log_config)?;

    info!("Starting prices server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    api::serve(pool, config).await
}
