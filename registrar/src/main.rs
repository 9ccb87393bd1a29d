use anyhow::{Context, Result};
use clap::Parser;
use fantasy_registrar::{run, Config};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(about = "Register tournament decks for every configured account.")]
struct Args {
    /// Path to the YAML config file
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // Setup logging
    let level = Level::from_str(&config.log_level)
        .with_context(|| format!("invalid log level: {}", config.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();
    info!(
        accounts = config.accounts.len(),
        base_url = %config.base_url,
        proxies = config.proxies.len(),
        "starting registrar"
    );

    run(&config).await?;
    Ok(())
}
