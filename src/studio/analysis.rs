//! Photo analysis: schema-constrained style assessment.
//!
//! The model is asked for a JSON object with six named fields and
//! exactly three recommended item ids from the grounding context. The
//! three-item count is a contract with the model, not enforced locally.
//! Analysis never fails upward: every error path degrades to an
//! explicit "unavailable" record the UI can always render.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::catalog::Catalog;
use crate::gemini::{GenerativeBackend, Part};
use crate::imagery;

use super::{StudioError, prompt};

/// Structured result of one photo analysis. Replaced atomically on each
/// new analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub body_type: String,
    pub skin_tone: String,
    pub style_advice: String,
    pub current_outfit_critique: String,
    pub trending_now: String,
    #[serde(default)]
    pub suggested_item_ids: Vec<String>,
}

impl AnalysisData {
    /// Placeholder shown before any analysis has run.
    pub fn pending() -> Self {
        Self {
            body_type: "等待分析...".to_string(),
            skin_tone: "等待分析...".to_string(),
            style_advice: "上传照片以获取个性化建议。".to_string(),
            current_outfit_critique: "暂无。".to_string(),
            trending_now: "正在加载趋势...".to_string(),
            suggested_item_ids: Vec::new(),
        }
    }

    /// Fallback returned when an analysis attempt fails.
    pub fn unavailable() -> Self {
        Self {
            body_type: "未知".to_string(),
            skin_tone: "未知".to_string(),
            style_advice: "无法分析图片，请尝试上传更清晰的照片。".to_string(),
            current_outfit_critique: "暂无".to_string(),
            trending_now: "暂无".to_string(),
            suggested_item_ids: Vec::new(),
        }
    }
}

/// Response schema the model must satisfy: six named fields, the id
/// list typed as a string array.
static ANALYSIS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "bodyType": { "type": "STRING", "description": "Estimated body type" },
            "skinTone": { "type": "STRING", "description": "Estimated skin tone" },
            "styleAdvice": { "type": "STRING", "description": "General clothing advice" },
            "currentOutfitCritique": { "type": "STRING", "description": "Critique of current outfit" },
            "trendingNow": { "type": "STRING", "description": "Fashion trends tip" },
            "suggestedItemIds": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of exactly 3 clothing IDs from the provided inventory that would suit the user best."
            }
        },
        "required": [
            "bodyType",
            "skinTone",
            "styleAdvice",
            "currentOutfitCritique",
            "trendingNow",
            "suggestedItemIds"
        ]
    })
});

/// Analyze a user photo against the catalog.
///
/// Never returns an error: any failure is logged and replaced with
/// [`AnalysisData::unavailable`], so the caller always receives a
/// renderable result.
pub async fn analyze_photo(
    backend: &dyn GenerativeBackend,
    catalog: &Catalog,
    photo: &str,
) -> AnalysisData {
    match try_analyze(backend, catalog, photo).await {
        Ok(data) => data,
        Err(e) => {
            warn!("{e}");
            AnalysisData::unavailable()
        }
    }
}

async fn try_analyze(
    backend: &dyn GenerativeBackend,
    catalog: &Catalog,
    photo: &str,
) -> Result<AnalysisData, StudioError> {
    let parts = vec![
        Part::jpeg(imagery::strip_data_uri(photo)),
        Part::text(prompt::analysis_instruction(&catalog.grounding_context())),
    ];

    let raw = backend
        .generate_structured(parts, ANALYSIS_SCHEMA.clone())
        .await
        .map_err(|e| StudioError::Analysis(e.to_string()))?;

    // The schema is a contract, not a guarantee: validate on receipt.
    serde_json::from_str(&raw).map_err(|e| StudioError::Analysis(format!("malformed reply: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::StubBackend;

    const PHOTO: &str = "data:image/jpeg;base64,UEhPVE8=";

    fn valid_reply() -> String {
        serde_json::json!({
            "bodyType": "匀称",
            "skinTone": "暖色调",
            "styleAdvice": "适合简约剪裁。",
            "currentOutfitCritique": "整体协调。",
            "trendingNow": "今年流行大地色。",
            "suggestedItemIds": ["c1", "m2", "f1"]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analysis_parses_structured_reply() {
        let backend = StubBackend::with_structured(&valid_reply());
        let catalog = Catalog::default();

        let data = analyze_photo(&backend, &catalog, PHOTO).await;
        assert_eq!(data.body_type, "匀称");
        assert_eq!(data.suggested_item_ids, vec!["c1", "m2", "f1"]);
    }

    #[tokio::test]
    async fn test_analysis_strips_photo_prefix_before_send() {
        let backend = StubBackend::with_structured(&valid_reply());
        let catalog = Catalog::default();

        analyze_photo(&backend, &catalog, PHOTO).await;

        let parts = backend.seen_parts.lock().unwrap();
        let inline = parts[0].inline_data.as_ref().unwrap();
        assert_eq!(inline.data, "UEhPVE8=");
        // The instruction part carries the grounding context.
        assert!(parts[1].text.as_ref().unwrap().contains("- ID: c1,"));
    }

    #[tokio::test]
    async fn test_failed_call_degrades_to_unavailable() {
        let backend = StubBackend::failing();
        let catalog = Catalog::default();

        let data = analyze_photo(&backend, &catalog, PHOTO).await;
        assert_eq!(data, AnalysisData::unavailable());
        assert!(data.suggested_item_ids.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_to_unavailable() {
        let backend = StubBackend::with_structured("not json at all");
        let catalog = Catalog::default();

        let data = analyze_photo(&backend, &catalog, PHOTO).await;
        assert_eq!(data, AnalysisData::unavailable());
    }

    #[tokio::test]
    async fn test_reply_missing_fields_degrades_to_unavailable() {
        let backend = StubBackend::with_structured(r#"{"bodyType": "匀称"}"#);
        let catalog = Catalog::default();

        let data = analyze_photo(&backend, &catalog, PHOTO).await;
        assert_eq!(data, AnalysisData::unavailable());
    }

    #[test]
    fn test_schema_names_all_six_fields() {
        let required = ANALYSIS_SCHEMA["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(
            ANALYSIS_SCHEMA["properties"]["suggestedItemIds"]["type"],
            "ARRAY"
        );
    }
}
