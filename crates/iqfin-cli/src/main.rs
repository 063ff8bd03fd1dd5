mod analyze;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use iqfin_core::Query;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "iqfin")]
#[command(about = "Company intelligence from brand data, website text, and AI analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Enrich a company name or domain into an intelligence report
    Analyze {
        /// Company name or domain (e.g. stripe.com)
        query: Query,
        /// Print the JSON export document instead of markdown
        #[arg(long)]
        json: bool,
        /// Also write the JSON export document to this file
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Validate configuration and print it with credentials redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = iqfin_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            query,
            json,
            output,
        } => analyze::run_analyze(&config, &query, json, output.as_deref()).await,
        Commands::Config => {
            println!("{config:#?}");
            Ok(())
        }
    }
}
