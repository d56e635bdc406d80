use std::path::PathBuf;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;

use crate::catalog::{Catalog, find_scene};
use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::imagery;
use crate::studio::{prompt, tryon};

#[derive(Args)]
pub struct TryOnArgs {
    /// Path to the photo of the person (JPEG or PNG)
    pub photo: PathBuf,

    /// Wardrobe item id (see `lumina catalog`)
    #[arg(short, long)]
    pub item: String,

    /// Scene id (default: the studio backdrop)
    #[arg(short, long, default_value = "sc1")]
    pub scene: String,

    /// Pose modifier
    #[arg(long, default_value = prompt::DEFAULT_POSE)]
    pub pose: String,

    /// Expression modifier
    #[arg(long, default_value = prompt::DEFAULT_EXPRESSION)]
    pub expression: String,

    /// Output file for the generated image
    #[arg(short, long, default_value = "tryon.jpg")]
    pub output: PathBuf,
}

pub async fn run(args: TryOnArgs, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;
    let backend = GeminiClient::new(&config.gemini)?;

    let catalog = Catalog::default();
    let item = catalog
        .find(&args.item)
        .ok_or_else(|| anyhow::anyhow!("unknown item: {}", args.item))?;
    let scene = find_scene(&args.scene)
        .ok_or_else(|| anyhow::anyhow!("unknown scene: {}", args.scene))?;

    let bytes = std::fs::read(&args.photo)?;
    let photo = BASE64.encode(&bytes);

    let image = tryon::render(&backend, &photo, item, scene, &args.pose, &args.expression).await?;

    let decoded = imagery::decode_payload(&image)?;
    std::fs::write(&args.output, decoded)?;
    println!("Wrote {}", args.output.display());

    Ok(())
}
