use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Output format: toml (default) or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },

    /// Get a configuration value
    Get {
        /// Config key (e.g., gemini.text_model)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Config key (e.g., server.port)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommands::Show { format } => show_config(&format, config_path),
        ConfigCommands::Get { key } => get_config(&key, config_path),
        ConfigCommands::Set { key, value } => set_config(&key, &value, config_path),
        ConfigCommands::Path => show_path(config_path),
    }
}

fn show_config(format: &str, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        _ => println!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}

fn get_config(key: &str, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("{}", config.get_value(key)?);
    Ok(())
}

fn set_config(key: &str, value: &str, config_path: Option<&str>) -> Result<()> {
    let path = Config::resolve_path(config_path)?;
    let mut config = Config::load(config_path)?;
    config.set_value(key, value)?;
    config.save(&path)?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn show_path(config_path: Option<&str>) -> Result<()> {
    println!("{}", Config::resolve_path(config_path)?.display());
    Ok(())
}
