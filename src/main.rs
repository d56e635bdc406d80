use anyhow::Result;
use clap::Parser;

use lumina::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve(args) => lumina::cli::serve::run(args, config_path).await,
        Commands::Catalog(args) => lumina::cli::catalog::run(args).await,
        Commands::Analyze(args) => lumina::cli::analyze::run(args, config_path).await,
        Commands::TryOn(args) => lumina::cli::tryon::run(args, config_path).await,
        Commands::Config(args) => lumina::cli::config::run(args, config_path).await,
    }
}
