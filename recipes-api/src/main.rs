//! recipes-api - Recipe catalog HTTP service
//!
//! Startup: parse arguments, load the TOML bootstrap file, initialize
//! tracing, open the database, create the schema, seed sample recipes into
//! an empty catalog, then serve until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use recipes_common::config::{self, ConfigOverrides, ServiceConfig, TomlConfig};
use recipes_common::db::{init_database, seed_if_empty};
use recipes_common::{RecipeRepository, Schema};
use recipes_api::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for recipes-api
#[derive(Parser, Debug)]
#[command(name = "recipes-api")]
#[command(about = "Recipe catalog HTTP service")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "RECIPES_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "RECIPES_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "RECIPES_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RECIPES_PORT")]
    port: Option<u16>,

    /// Do not insert the sample recipes into an empty catalog
    #[arg(long)]
    no_seed: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            no_seed: self.no_seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };
    let config = ServiceConfig::resolve(args.overrides(), toml_config);

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "recipes_api={level},recipes_common={level},tower_http={level}",
                    level = config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting recipes-api v{}",
        env!("CARGO_PKG_VERSION")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path, config.max_connections)
        .await
        .context("Failed to open database")?;

    let repo = RecipeRepository::open(pool, Schema::recipe_catalog())
        .await
        .context("Failed to create schema")?;

    if config.seed_sample_data {
        seed_if_empty(&repo)
            .await
            .context("Failed to seed sample recipes")?;
    }

    let app = build_router(AppState::new(repo));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("recipes-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
