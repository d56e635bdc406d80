pub mod analyze;
pub mod catalog;
pub mod config;
pub mod serve;
pub mod tryon;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lumina")]
#[command(author, version, about = "AI virtual try-on studio service")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "LUMINA_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server for the web UI
    Serve(serve::ServeArgs),

    /// List wardrobe items and scenes
    Catalog(catalog::CatalogArgs),

    /// Analyze a photo and print style advice
    Analyze(analyze::AnalyzeArgs),

    /// Generate a try-on image for a photo and wardrobe item
    #[command(name = "tryon")]
    TryOn(tryon::TryOnArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}
