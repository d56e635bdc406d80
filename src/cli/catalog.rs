use anyhow::Result;
use clap::Args;

use crate::catalog::{CLOTHING_ITEMS, SCENES};

#[derive(Args)]
pub struct CatalogArgs {
    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub async fn run(args: CatalogArgs) -> Result<()> {
    match args.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "items": &*CLOTHING_ITEMS,
                "scenes": &*SCENES,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("Wardrobe ({} items):", CLOTHING_ITEMS.len());
            for item in CLOTHING_ITEMS.iter() {
                println!(
                    "  {:6} [{}] {} — {}",
                    item.id,
                    item.category.label(),
                    item.name,
                    item.description
                );
            }
            println!();
            println!("Scenes ({}):", SCENES.len());
            for scene in SCENES.iter() {
                println!("  {:6} {} — {}", scene.id, scene.name, scene.prompt);
            }
        }
    }

    Ok(())
}
