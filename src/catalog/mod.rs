//! Wardrobe and scene data.
//!
//! Built-in items and scenes are curated and static for the process
//! lifetime. Custom items are user uploads: they live only in session
//! memory, are never persisted, and never enter the model-visible
//! grounding context.

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::imagery;

/// Style tags for wardrobe items. Serialized as the zh-CN display label
/// the catalog and UI use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClothingCategory {
    #[serde(rename = "自定义上传")]
    Custom,
    #[serde(rename = "休闲")]
    Casual,
    #[serde(rename = "正式")]
    Formal,
    #[serde(rename = "运动")]
    Sports,
    #[serde(rename = "晚礼服")]
    Evening,
    #[serde(rename = "街头")]
    Streetwear,
    #[serde(rename = "商务休闲")]
    BusinessCasual,
    #[serde(rename = "极简主义")]
    Minimalist,
    #[serde(rename = "复古风")]
    Vintage,
    #[serde(rename = "波西米亚")]
    Bohemian,
}

impl ClothingCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ClothingCategory::Custom => "自定义上传",
            ClothingCategory::Casual => "休闲",
            ClothingCategory::Formal => "正式",
            ClothingCategory::Sports => "运动",
            ClothingCategory::Evening => "晚礼服",
            ClothingCategory::Streetwear => "街头",
            ClothingCategory::BusinessCasual => "商务休闲",
            ClothingCategory::Minimalist => "极简主义",
            ClothingCategory::Vintage => "复古风",
            ClothingCategory::Bohemian => "波西米亚",
        }
    }
}

/// A wardrobe entry. `image` is a remote URL for curated items or a
/// `data:` URI for custom uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub category: ClothingCategory,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub is_custom: bool,
}

/// A try-on backdrop. `prompt` is the scene description consumed by the
/// try-on request builder; `image` is the thumbnail the UI shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub image: String,
}

fn curated(
    id: &str,
    name: &str,
    category: ClothingCategory,
    image: &str,
    description: &str,
) -> ClothingItem {
    ClothingItem {
        id: id.to_string(),
        name: name.to_string(),
        category,
        image: image.to_string(),
        description: description.to_string(),
        is_custom: false,
    }
}

fn scene(id: &str, name: &str, prompt: &str, image: &str) -> Scene {
    Scene {
        id: id.to_string(),
        name: name.to_string(),
        prompt: prompt.to_string(),
        image: image.to_string(),
    }
}

/// The curated wardrobe.
pub static CLOTHING_ITEMS: Lazy<Vec<ClothingItem>> = Lazy::new(|| {
    use ClothingCategory::*;
    vec![
        curated(
            "c1",
            "白色亚麻衬衫 & 斜纹棉布裤",
            Casual,
            "https://images.unsplash.com/photo-1489987707025-afc232f7ea0f?q=80&w=2670&auto=format&fit=crop",
            "宽松版型的白色亚麻衬衫，搭配米色斜纹棉布裤，轻松自在。",
        ),
        curated(
            "c2",
            "经典牛仔夹克套装",
            Casual,
            "https://images.unsplash.com/photo-1576995853123-5a10305d93c0?q=80&w=2670&auto=format&fit=crop",
            "经典的复古水洗蓝色牛仔夹克，搭配同色系直筒牛仔裤。",
        ),
        curated(
            "c3",
            "条纹T恤 & 短裤",
            Casual,
            "https://images.unsplash.com/photo-1596755094514-f87e34085b2c?q=80&w=2576&auto=format&fit=crop",
            "法式海军风条纹T恤，搭配卡其色百慕大短裤。",
        ),
        curated(
            "f1",
            "海军蓝定制西装",
            Formal,
            "https://images.unsplash.com/photo-1594938298603-c8148c4dae35?q=80&w=2680&auto=format&fit=crop",
            "剪裁利落的意大利羊毛海军蓝西装，搭配挺括的白衬衫。",
        ),
        curated(
            "f2",
            "米色双排扣风衣",
            Formal,
            "https://images.unsplash.com/photo-1487222477894-8943e31ef7b2?q=80&w=2695&auto=format&fit=crop",
            "经典的米色双排扣风衣，内搭深色商务套装。",
        ),
        curated(
            "f3",
            "灰色格纹西装",
            Formal,
            "https://images.unsplash.com/photo-1593030761757-71bd90dbe3a4?q=80&w=2702&auto=format&fit=crop",
            "英伦风格灰色格纹三件套西装，彰显绅士风度。",
        ),
        curated(
            "bc1",
            "高领毛衣 & 西装裤",
            BusinessCasual,
            "https://images.unsplash.com/photo-1552374196-1ab2a1c593e8?q=80&w=2574&auto=format&fit=crop",
            "黑色羊绒高领毛衣搭配灰色羊毛西裤，干练且保暖。",
        ),
        curated(
            "bc2",
            "Polo衫 & 休闲西装",
            BusinessCasual,
            "https://images.unsplash.com/photo-1617137968427-85924c809a10?q=80&w=2574&auto=format&fit=crop",
            "针织Polo衫外搭非结构化休闲西装，适合周五办公。",
        ),
        curated(
            "m1",
            "全黑机能风",
            Minimalist,
            "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?q=80&w=2000&auto=format&fit=crop",
            "全黑色系搭配，修身剪裁，注重面料质感与层次。",
        ),
        curated(
            "m2",
            "大地色系套装",
            Minimalist,
            "https://images.unsplash.com/photo-1574620021665-2771d999083f?q=80&w=2574&auto=format&fit=crop",
            "燕麦色亚麻套装，线条流畅，设计极简。",
        ),
        curated(
            "e1",
            "红色天鹅绒礼服",
            Evening,
            "https://images.unsplash.com/photo-1566174053879-31528523f8ae?q=80&w=2548&auto=format&fit=crop",
            "奢华的深红色天鹅绒长裙，露背设计，适合晚宴。",
        ),
        curated(
            "e2",
            "经典黑领结燕尾服",
            Evening,
            "https://images.unsplash.com/photo-1550246140-29f40b909e5a?q=80&w=2574&auto=format&fit=crop",
            "黑色缎面翻领燕尾服，搭配黑色领结。",
        ),
        curated(
            "st1",
            "Oversize 卫衣 & 工装",
            Streetwear,
            "https://images.unsplash.com/photo-1515886657613-9f3515b0c78f?q=80&w=2644&auto=format&fit=crop",
            "图案印花大廓形卫衣，搭配多口袋工装束脚裤。",
        ),
        curated(
            "st2",
            "棒球夹克 & 运动裤",
            Streetwear,
            "https://images.unsplash.com/photo-1551852384-a8e1b5435062?q=80&w=2644&auto=format&fit=crop",
            "美式复古棒球夹克，搭配侧条纹运动裤。",
        ),
        curated(
            "v1",
            "波点连衣裙",
            Vintage,
            "https://images.unsplash.com/photo-1605763240004-7e93b172d754?q=80&w=2574&auto=format&fit=crop",
            "50年代风格波点收腰连衣裙，搭配红色腰带。",
        ),
        curated(
            "v2",
            "灯芯绒西装",
            Vintage,
            "https://images.unsplash.com/photo-1595341888016-a392ef81b7de?q=80&w=2679&auto=format&fit=crop",
            "棕色灯芯绒西装外套，搭配高腰阔腿裤。",
        ),
        curated(
            "b1",
            "印花长裙",
            Bohemian,
            "https://images.unsplash.com/photo-1515372039744-b8f02a3ae446?q=80&w=2576&auto=format&fit=crop",
            "飘逸的民族风印花长裙，搭配流苏配饰。",
        ),
    ]
});

/// The available try-on backdrops.
pub static SCENES: Lazy<Vec<Scene>> = Lazy::new(|| {
    vec![
        scene(
            "sc1",
            "摄影棚",
            "在专业的极简主义摄影棚内，光线柔和，背景是纯净的灰色",
            "https://picsum.photos/id/1/200/200",
        ),
        scene(
            "sc2",
            "城市街道",
            "白天繁忙的现代城市街道上，背景有模糊的摩天大楼和车流",
            "https://picsum.photos/id/10/200/200",
        ),
        scene(
            "sc3",
            "豪华酒店",
            "在豪华五星级酒店大堂，金色的温暖灯光，大理石地面",
            "https://picsum.photos/id/20/200/200",
        ),
        scene(
            "sc4",
            "海滩日落",
            "在海边的沙滩上，金色的夕阳，海浪轻轻拍打，度假氛围",
            "https://picsum.photos/id/30/200/200",
        ),
        scene(
            "sc5",
            "现代办公室",
            "在时尚的现代科技公司办公室，落地玻璃窗，明亮通透",
            "https://picsum.photos/id/40/200/200",
        ),
        scene(
            "sc6",
            "阿尔卑斯雪山",
            "在壮丽的雪山顶上，背景是连绵的白雪和蓝天，寒冷清新的氛围",
            "https://images.unsplash.com/photo-1491553895911-0055eca6402d?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc7",
            "冬季雪地",
            "在积雪覆盖的森林小径，松树上挂满白雪，冬日静谧",
            "https://images.unsplash.com/photo-1457269449834-928af6406ed3?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc8",
            "热带雨林",
            "在郁郁葱葱的热带雨林中，阳光透过巨大的绿色叶子洒下斑驳光影",
            "https://images.unsplash.com/photo-1511497584788-876760111969?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc9",
            "赛博朋克霓虹",
            "在未来的赛博朋克街道，夜晚，到处是紫色和蓝色的霓虹灯牌，雨后湿润的地面",
            "https://images.unsplash.com/photo-1515630278258-407f66498911?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc10",
            "日式庭院",
            "在宁静的传统日式庭院，有枯山水、樱花树和木质走廊",
            "https://images.unsplash.com/photo-1528360983277-13d9b152c6d1?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc11",
            "巴黎咖啡馆",
            "在巴黎街头的露天咖啡馆，藤编椅子，浪漫的法式建筑背景",
            "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?q=80&w=1000&auto=format&fit=crop",
        ),
        scene(
            "sc12",
            "黄昏屋顶",
            "在城市高楼的屋顶露台，背景是黄昏时分绚丽的城市天际线",
            "https://images.unsplash.com/photo-1533414417583-f07094726f6e?q=80&w=1000&auto=format&fit=crop",
        ),
    ]
});

/// Look up a scene by id.
pub fn find_scene(id: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|s| s.id == id)
}

/// The wardrobe visible to one session: the curated items plus that
/// session's custom uploads.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    custom: Vec<ClothingItem>,
}

impl Catalog {
    /// All items in catalog order, curated first.
    pub fn items(&self) -> impl Iterator<Item = &ClothingItem> {
        CLOTHING_ITEMS.iter().chain(self.custom.iter())
    }

    /// Look up an item by id across curated and custom entries.
    pub fn find(&self, id: &str) -> Option<&ClothingItem> {
        self.items().find(|item| item.id == id)
    }

    pub fn custom_items(&self) -> &[ClothingItem] {
        &self.custom
    }

    /// Register a custom upload. The image must be an embedded data URI
    /// with a well-formed base64 body; remote URLs are rejected because
    /// the try-on builder needs the garment pixels, not a link.
    pub fn add_custom(&mut self, name: &str, image: &str) -> Result<ClothingItem> {
        if !imagery::is_data_uri(image) {
            anyhow::bail!("custom item image must be an embedded data URI");
        }
        imagery::decode_payload(image)
            .map_err(|e| anyhow::anyhow!("invalid base64 image payload: {e}"))?;

        let name = name.trim();
        let item = ClothingItem {
            id: format!("custom-{}", Uuid::new_v4()),
            name: if name.is_empty() {
                "我的服装".to_string()
            } else {
                name.to_string()
            },
            category: ClothingCategory::Custom,
            image: image.to_string(),
            description: "用户上传的自定义服装。".to_string(),
            is_custom: true,
        };
        self.custom.push(item.clone());
        Ok(item)
    }

    pub fn clear_custom(&mut self) {
        self.custom.clear();
    }

    /// Serialize the wardrobe for use as model grounding context: one
    /// line per item, catalog order. Custom items are excluded; they
    /// are session-private and carry no curated description.
    pub fn grounding_context(&self) -> String {
        self.items()
            .filter(|item| !item.is_custom)
            .map(|item| {
                format!(
                    "- ID: {}, 名称: {}, 风格: {}, 描述: {}",
                    item.id,
                    item.name,
                    item.category.label(),
                    item.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_uri() -> String {
        use base64::Engine;
        let body = base64::engine::general_purpose::STANDARD.encode(b"fake jpeg bytes");
        format!("data:image/jpeg;base64,{body}")
    }

    #[test]
    fn test_grounding_context_one_line_per_curated_item() {
        let catalog = Catalog::default();
        let context = catalog.grounding_context();
        assert_eq!(context.lines().count(), CLOTHING_ITEMS.len());
        for item in CLOTHING_ITEMS.iter() {
            assert!(context.contains(&format!("- ID: {},", item.id)));
        }
    }

    #[test]
    fn test_grounding_context_excludes_custom_items() {
        let mut catalog = Catalog::default();
        let item = catalog.add_custom("私人外套", &data_uri()).unwrap();

        let context = catalog.grounding_context();
        assert_eq!(context.lines().count(), CLOTHING_ITEMS.len());
        assert!(!context.contains(&item.id));
        assert!(!context.contains("私人外套"));
    }

    #[test]
    fn test_find_spans_curated_and_custom() {
        let mut catalog = Catalog::default();
        assert!(catalog.find("c1").is_some());
        assert!(catalog.find("zzz").is_none());

        let item = catalog.add_custom("测试", &data_uri()).unwrap();
        assert_eq!(catalog.find(&item.id).unwrap().name, "测试");
        assert!(catalog.find(&item.id).unwrap().is_custom);
    }

    #[test]
    fn test_add_custom_rejects_remote_urls() {
        let mut catalog = Catalog::default();
        assert!(
            catalog
                .add_custom("远程", "https://example.com/a.jpg")
                .is_err()
        );
    }

    #[test]
    fn test_add_custom_rejects_malformed_base64() {
        let mut catalog = Catalog::default();
        assert!(
            catalog
                .add_custom("坏数据", "data:image/jpeg;base64,@@not base64@@")
                .is_err()
        );
    }

    #[test]
    fn test_add_custom_defaults_blank_name() {
        let mut catalog = Catalog::default();
        let item = catalog.add_custom("  ", &data_uri()).unwrap();
        assert_eq!(item.name, "我的服装");
        assert_eq!(item.category, ClothingCategory::Custom);
    }

    #[test]
    fn test_clear_custom_empties_session_wardrobe() {
        let mut catalog = Catalog::default();
        catalog.add_custom("一件", &data_uri()).unwrap();
        catalog.clear_custom();
        assert!(catalog.custom_items().is_empty());
        assert_eq!(catalog.items().count(), CLOTHING_ITEMS.len());
    }

    #[test]
    fn test_category_label_round_trips_through_serde() {
        let json = serde_json::to_string(&ClothingCategory::BusinessCasual).unwrap();
        assert_eq!(json, "\"商务休闲\"");
        let back: ClothingCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClothingCategory::BusinessCasual);
    }

    #[test]
    fn test_find_scene() {
        assert_eq!(find_scene("sc1").unwrap().name, "摄影棚");
        assert!(find_scene("nope").is_none());
    }
}
