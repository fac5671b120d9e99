use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pmos_llm::LlmClient;
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LLM_URL: &str = "https://openrouter.ai/api";

#[derive(Parser)]
#[command(name = "pmos")]
#[command(about = "Gamified multi-agent product management backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        #[arg(short, long, default_value = "8787")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Postgres connection string; in-memory storage when absent
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Apply the Postgres schema and exit
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Drain due impact-analysis rows once
    DrainImpact {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Show the level reached at a given XP total
    Level { xp: i64 },
}

/// The LLM gateway, when `PMOS_LLM_API_KEY` is set.
pub(crate) fn llm_from_env() -> Result<Option<Arc<LlmClient>>> {
    let Some(api_key) = std::env::var("PMOS_LLM_API_KEY").ok().filter(|k| !k.trim().is_empty())
    else {
        return Ok(None);
    };
    let base_url = std::env::var("PMOS_LLM_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LLM_URL.to_owned());
    let client = LlmClient::new(api_key, base_url)?;
    tracing::info!(base_url = client.base_url(), model = client.model(), "LLM gateway configured");
    Ok(Some(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, database_url } => {
            commands::serve::run(port, host, database_url.as_deref()).await
        },
        Commands::Migrate { database_url } => commands::migrate::run(&database_url).await,
        Commands::DrainImpact { limit, database_url } => {
            commands::drain::run(limit, &database_url).await
        },
        Commands::Level { xp } => commands::level::run(xp),
    }
}
