use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use studio_application::DashboardController;
use studio_core::config::StudioConfig;
use studio_interaction::{HttpResourceApi, build_provider, config::load_secret_config};

mod commands;

#[derive(Parser)]
#[command(name = "teos-studio")]
#[command(about = "TEOS Studio - app blueprints and deploy lifecycle from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/teos-studio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive dashboard session (default)
    Repl,
    /// List the seeded projects
    Projects {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Install a marketplace module through the backend API
    Install {
        /// Module id
        module: String,
    },
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so they do not interleave with REPL output on stdout
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<StudioConfig> {
    let config = match path {
        Some(path) => StudioConfig::load_from(path)?,
        None => StudioConfig::load_or_default()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let secrets = load_secret_config().context("Failed to load secret.json")?;
    let provider = build_provider(&config.provider, &secrets);
    let resources = Arc::new(HttpResourceApi::new(config.backend.base_url.clone()));

    let controller = DashboardController::from_config(&config, provider)
        .await?
        .with_resources(resources);
    let controller = Arc::new(controller);

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => commands::repl::run(controller).await?,
        Commands::Projects { json } => commands::projects::list(&controller, json).await?,
        Commands::Install { module } => commands::install::run(&controller, &module).await?,
    }

    Ok(())
}
