use std::sync::Arc;

use tracing::{error, info};

use docvault::{Config, Database, FileStorage, WebServer};

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = docvault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        docvault::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> docvault::Result<()> {
    config.validate()?;
    info!("docvault starting");

    let db = Database::open(&config.database.path).await?;
    let storage = FileStorage::new(&config.files.storage_path)?;
    info!(path = %config.files.storage_path, "File storage initialized");

    if !config.web.enabled {
        info!("Web API disabled in configuration, nothing to serve");
        return Ok(());
    }

    let server = WebServer::new(&config.web, &config.files, Arc::new(db), Arc::new(storage))?;
    server.run().await?;
    Ok(())
}
