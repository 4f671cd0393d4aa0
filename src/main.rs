use anyhow::Result;
use brainstash::{run_server, setup_logging, AppConfig, LogConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    // Populate the environment from .env before the config layer reads it.
    dotenvy::dotenv().ok();

    setup_logging(LogConfig::default());

    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_file)?;

    run_server(config).await
}
