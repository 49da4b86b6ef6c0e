use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use dao_metrics::{config::Settings, DaoAdapter, Engine};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "dao-metrics")]
#[clap(about = "Aggregate DAO revenue and on-chain metrics", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default and config/local)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh schedulers until interrupted
    Serve,

    /// Fetch the weekly revenue chart for one DAO
    Revenue {
        /// DAO symbol
        #[clap(short, long)]
        dao: String,
    },

    /// Read on-chain staking data for one DAO
    Onchain {
        /// DAO symbol
        #[clap(short, long)]
        dao: String,
    },

    /// Refresh every DAO once and print the composed view
    Memory,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        // logging is not up yet at this point
        None => Settings::new().unwrap_or_else(|e| {
            eprintln!("Using default settings: {}", e);
            Settings::default()
        }),
    };

    settings
        .validate()
        .map_err(|e| anyhow!("Invalid settings: {}", e))?;

    Ok(settings)
}

fn adapter_for(engine: &Engine, symbol: &str) -> anyhow::Result<Option<Arc<dyn DaoAdapter>>> {
    let dao = engine
        .dao(symbol)
        .ok_or_else(|| anyhow!("Unknown DAO: {}", symbol))?;

    Ok(engine.factory().create(dao)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Settings are read before logging so app.log_level can seed the filter
    let settings = load_settings(cli.config.as_ref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("{} starting", settings.app.name);
    let engine = Engine::from_settings(settings)?;

    match cli.command {
        Commands::Serve => {
            let handles = engine.start();

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");

            for handle in handles {
                handle.abort();
            }
        }

        Commands::Revenue { dao } => match adapter_for(&engine, &dao)? {
            Some(adapter) => {
                let chart = adapter.revenue_chart().await?;
                println!("{}", serde_json::to_string_pretty(&chart)?);
            }
            None => println!("{{}}"),
        },

        Commands::Onchain { dao } => match adapter_for(&engine, &dao)? {
            Some(adapter) => {
                let data = adapter.onchain_data().await?;
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
            None => println!("{{}}"),
        },

        Commands::Memory => {
            let (revenue, onchain) = engine.refresh_all().await;
            info!(
                "Revenue: {} updated, {} failed; on-chain: {} updated, {} failed",
                revenue.updated, revenue.failed, onchain.updated, onchain.failed
            );

            println!("{}", serde_json::to_string_pretty(&engine.memory())?);
        }
    }

    Ok(())
}
