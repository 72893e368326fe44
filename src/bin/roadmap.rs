//! # Roadmap Platform Command Line
//!
//! Runs the HTTP server and the data management commands against the
//! configured store.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use roadmap_platform::auth::PasswordHasher;
use roadmap_platform::config::{AppConfig, ConfigManager, StorageBackend};
use roadmap_platform::logging::init_structured_logging;
use roadmap_platform::seed::{DataManager, SeedFiles, SeedOutcome};
use roadmap_platform::storage::{create_store, PgStore};
use roadmap_platform::web::{create_app, AppState};

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(about = "Gamified developer-skills roadmap backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Directory holding roadmap.toml and roadmap.{environment}.toml
    #[arg(short, long, global = true, env = "ROADMAP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Environment name (development, test, production)
    #[arg(short, long, global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve,

    /// Apply database migrations
    Migrate,

    /// Load demo data into an empty store
    Init {
        /// Clear existing data first
        #[arg(long)]
        force: bool,

        #[arg(long)]
        roadmap_file: Option<PathBuf>,

        #[arg(long)]
        users_file: Option<PathBuf>,

        #[arg(long)]
        progress_file: Option<PathBuf>,
    },

    /// Delete all nodes, users and progress
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Write the store contents as JSON files
    Export {
        #[arg(long, default_value = "data_export")]
        output_dir: PathBuf,
    },

    /// Print row counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.environment {
        Some(environment) => {
            ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        }
        None => ConfigManager::load_from_directory(cli.config_dir.clone()),
    }
    .context("failed to load configuration")?;
    let config = Arc::new(manager.config().clone());

    init_structured_logging(&config.environment, &config.logging);
    info!(config = %manager.debug_config(), "Configuration loaded");

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(&config).await,
        Commands::Init {
            force,
            roadmap_file,
            users_file,
            progress_file,
        } => {
            let defaults = SeedFiles::from_config(&config.seed);
            let files = SeedFiles {
                roadmap: roadmap_file.or(defaults.roadmap),
                users: users_file.or(defaults.users),
                progress: progress_file.or(defaults.progress),
            };
            let outcome = data_manager(&config).await?.initialize(&files, force).await?;
            match outcome {
                SeedOutcome::Skipped { existing_nodes } => println!(
                    "Store already holds {existing_nodes} nodes; use --force to reload"
                ),
                SeedOutcome::Seeded {
                    nodes,
                    users,
                    progress,
                } => println!("Loaded {nodes} nodes, {users} users, {progress} progress rows"),
            }
            Ok(())
        }
        Commands::Clear { yes } => {
            if !yes && !confirm("Delete ALL roadmap data?")? {
                println!("Aborted");
                return Ok(());
            }
            data_manager(&config).await?.clear().await?;
            println!("All data cleared");
            Ok(())
        }
        Commands::Export { output_dir } => {
            let written = data_manager(&config).await?.export(&output_dir).await?;
            for path in written {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Status => {
            let counts = data_manager(&config).await?.status().await?;
            println!("{}", serde_json::to_string_pretty(&counts)?);
            Ok(())
        }
    }
}

async fn serve(config: Arc<AppConfig>) -> Result<()> {
    let store = create_store(&config).await?;

    if config.seed.on_startup {
        let manager = DataManager::new(
            store.clone(),
            PasswordHasher::new(config.auth.legacy_password_salt.clone()),
        );
        if let Err(e) = manager
            .initialize(&SeedFiles::from_config(&config.seed), false)
            .await
        {
            warn!(error = %e, "Startup seeding failed, continuing with existing data");
        }
    }

    let bind_address = config.web.bind_address.clone();
    let app = create_app(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    info!(bind_address = %bind_address, "Roadmap API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("Server stopped");
    Ok(())
}

async fn migrate(config: &AppConfig) -> Result<()> {
    if config.storage.backend != StorageBackend::Postgres {
        bail!("migrations only apply to the postgres storage backend");
    }
    let store = PgStore::connect(&config.database).await?;
    store.migrate().await?;
    println!("Migrations applied");
    Ok(())
}

async fn data_manager(config: &AppConfig) -> Result<DataManager> {
    let store = create_store(config).await?;
    if config.storage.backend == StorageBackend::Memory {
        warn!("Using the in-memory store; changes are lost when the command exits");
    }
    Ok(DataManager::new(
        store,
        PasswordHasher::new(config.auth.legacy_password_salt.clone()),
    ))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
