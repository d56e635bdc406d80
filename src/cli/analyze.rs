use std::path::PathBuf;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::studio::analysis;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the photo to analyze (JPEG or PNG)
    pub photo: PathBuf,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> Result<()> {
    let config = Config::load(config_path)?;
    let backend = GeminiClient::new(&config.gemini)?;

    let bytes = std::fs::read(&args.photo)?;
    let photo = BASE64.encode(&bytes);

    let catalog = Catalog::default();
    let data = analysis::analyze_photo(&backend, &catalog, &photo).await;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&data)?),
        _ => {
            println!("体型:     {}", data.body_type);
            println!("肤色:     {}", data.skin_tone);
            println!("穿搭建议: {}", data.style_advice);
            println!("当前造型: {}", data.current_outfit_critique);
            println!("流行趋势: {}", data.trending_now);

            if data.suggested_item_ids.is_empty() {
                println!("推荐单品: 暂无");
            } else {
                println!("推荐单品:");
                for id in &data.suggested_item_ids {
                    match catalog.find(id) {
                        Some(item) => println!("  {} — {}", item.id, item.name),
                        None => println!("  {} — (不在库存中)", id),
                    }
                }
            }
        }
    }

    Ok(())
}
