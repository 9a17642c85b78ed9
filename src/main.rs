use std::process::ExitCode;

use tracing::{error, info};

use bde_tracker::auth::PasswordHasher;
use bde_tracker::bootstrap::ensure_bootstrap_machine;
use bde_tracker::{Config, Database, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = bde_tracker::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        bde_tracker::logging::init_console_only(&config.logging.level);
    }

    info!("BDE work tracker starting");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> bde_tracker::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;

    let hasher = PasswordHasher::from_config(&config.auth)?;
    ensure_bootstrap_machine(&db, &hasher, &config.auth).await?;

    let server = WebServer::new(&config, db.clone())?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    server.run().await?;

    db.close().await;
    Ok(())
}
