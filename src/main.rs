//! spotify-prices - Premium plan prices across storefronts, in one currency

use anyhow::Result;
use clap::{Parser, Subcommand};
use spotify_prices::commands::{CollectCommand, RatesCommand, RunCommand};
use spotify_prices::config::{Config, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "spotify-prices",
    version,
    about = "Collect Spotify Premium prices across country storefronts",
    long_about = "Scrapes plan prices from every configured storefront, converts them to a reference currency with live exchange rates, and publishes the cheapest price per country and plan."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "PRICES_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Storefronts loaded at the same time (1-6)
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Reference currency for converted prices
    #[arg(long, global = true)]
    base_currency: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect prices and publish the dataset
    Run {
        /// Collect only; skip the git publish step
        #[arg(long)]
        no_publish: bool,
    },

    /// Collect prices and print them
    #[command(alias = "scrape")]
    Collect,

    /// Show the exchange rate of each configured currency
    Rates,

    /// List configured storefronts
    Countries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(base) = cli.base_currency {
        config.base_currency = base.to_uppercase();
    }

    config.validate()?;

    match cli.command {
        Commands::Run { no_publish } => {
            let cmd = RunCommand::new(config, !no_publish);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Collect => {
            let cmd = CollectCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Rates => {
            let cmd = RatesCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Countries => {
            println!("Configured storefronts:\n");
            println!("{:<6} {:<10} {}", "Code", "Currency", "URL");
            println!("{:-<6} {:-<10} {:-<40}", "", "", "");

            for country in &config.countries {
                println!(
                    "{:<6} {:<10} {}",
                    country.code,
                    country.currency,
                    country.storefront_url(&config.site_root, &config.product_path)
                );
            }
        }
    }

    Ok(())
}
