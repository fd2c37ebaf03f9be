use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod api;
mod commands;
mod config;
mod db;
mod models;
mod push;
mod reports;
mod sync;

use api::HttpApi;
use commands::{ConfigCommand, LogCommand, ReportCommand, WatchCommand};
use config::Config;
use db::{init_db, LogStore};
use sync::SyncManager;

#[derive(Parser)]
#[command(name = "callog")]
#[command(version)]
#[command(about = "An offline-first calorie log client", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and browse calorie logs
    Log(LogCommand),

    /// Reports over the full dataset (online only)
    Report(ReportCommand),

    /// Follow live push updates
    Watch(WatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Log(cmd)) => {
            let manager = build_manager(&config).await?;
            cmd.run(&manager).await?;
        }
        Some(Commands::Report(cmd)) => {
            let manager = build_manager(&config).await?;
            cmd.run(&manager).await?;
        }
        Some(Commands::Watch(cmd)) => {
            let manager = build_manager(&config).await?;
            cmd.run(&manager, &config.server_url).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

async fn build_manager(config: &Config) -> Result<SyncManager<HttpApi>, Box<dyn std::error::Error>> {
    let pool = init_db(&config.database_path).await?;
    let store = LogStore::new(pool);
    let api = HttpApi::new(config.server_url.clone());
    Ok(SyncManager::new(api, store))
}
