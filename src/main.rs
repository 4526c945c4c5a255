use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digestor::config;
use digestor::pipeline::run_from_file;
use digestor::render::today_string;

/// Collect today's tweets, trending repositories, feeds and Hacker News
/// stories and mail them as one HTML digest.
#[derive(Parser, Debug)]
#[command(name = "digestor")]
#[command(version)]
#[command(about = "Send yourself a daily content digest", long_about = None)]
struct Cli {
    /// Config file path (default: ~/.digestor.json)
    #[arg(short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digestor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let today = today_string();
    println!("Start generating today's digest: {}", today);

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(config::default_path);
    info!("Using configuration file {}", path.display());

    run_from_file(&path, &today)
        .await
        .context("digest run aborted")?;

    println!("Email sent.");
    Ok(())
}
