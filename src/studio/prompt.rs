//! Model-facing prompt text.
//!
//! Everything the model reads is zh-CN, matching the product audience.
//! The advisor persona and the `[[id]]` reference rule live here so the
//! format is defined in exactly one place.

use crate::catalog::ClothingItem;

/// Applied when the user has not set a pose.
pub const DEFAULT_POSE: &str = "自然站立";
/// Applied when the user has not set an expression.
pub const DEFAULT_EXPRESSION: &str = "自然微笑";

/// The advisor's persona name.
pub const ADVISOR_PERSONA: &str = "阿猫阿春";

/// Fixed reply appended when an advisor call fails. Chat is best-effort;
/// conversational continuity beats error precision.
pub const ADVISOR_FALLBACK_REPLY: &str = "抱歉，我现在无法连接到时尚网络。";

/// Instruction part of an analysis request: assess the photo and pick
/// exactly three items from the supplied inventory context.
pub fn analysis_instruction(inventory_context: &str) -> String {
    format!(
        "分析这张照片中人物的时尚风格、体型和肤色。\n\n\
         可用的服装库存列表如下：\n{inventory_context}\n\n\
         请从库存中挑选 3 件最适合该用户的服装，并返回其ID到 suggestedItemIds 字段中。\n\
         请用中文回答，语气礼貌且专业。"
    )
}

/// Inputs shared by both try-on prompt variants.
pub struct TryOnPromptParams<'a> {
    pub item: &'a ClothingItem,
    pub scene: &'a str,
    pub pose: &'a str,
    pub expression: &'a str,
}

/// Prompt for the two-image request: the garment is supplied as a second
/// reference image (custom uploads have pixels but no curated text).
pub fn try_on_with_garment_image(params: &TryOnPromptParams) -> String {
    let mut lines = Vec::new();
    lines.push("任务：生成一张高质量的写实人像照片。".to_string());
    lines.push(String::new());
    lines.push("输入说明：".to_string());
    lines.push("- 第一张图片：原始模特图（参考人物ID）。".to_string());
    lines.push("- 第二张图片：目标服装图（参考服装样式）。".to_string());
    lines.push(String::new());
    lines.push("生成要求：".to_string());
    push_identity_requirement(&mut lines, "第一张图");
    lines.push("2. 服装与动作融合：".to_string());
    lines.push("   - 让模特穿上第二张图中的衣服。".to_string());
    push_pose_and_scene_requirements(&mut lines, params);
    lines.join("\n")
}

/// Prompt for the single-image request: the garment is specified by its
/// catalog name and description (curated items have rich text, and their
/// stock photos are unsuitable as garment references).
pub fn try_on_with_garment_text(params: &TryOnPromptParams) -> String {
    let mut lines = Vec::new();
    lines.push("任务：生成一张高质量的写实人像照片。".to_string());
    lines.push(String::new());
    lines.push("输入说明：".to_string());
    lines.push("- 图片：原始模特图（参考人物ID）。".to_string());
    lines.push(String::new());
    lines.push("生成要求：".to_string());
    push_identity_requirement(&mut lines, "原图");
    lines.push("2. 服装与动作融合：".to_string());
    lines.push(format!("   - 将模特的服装替换为：{}。", params.item.name));
    lines.push(format!(
        "   - 服装细节描述：{}。",
        params.item.description.trim_end_matches('。')
    ));
    push_pose_and_scene_requirements(&mut lines, params);
    lines.join("\n")
}

fn push_identity_requirement(lines: &mut Vec<String>, source: &str) {
    lines.push("1. 严格保持人物身份（ID Consistency）：".to_string());
    lines.push(format!(
        "   - 必须完全保留{source}中人物的面部特征、五官比例、脸型和肤色。"
    ));
    lines.push(
        "   - 重要：生成的脸必须与原图中的人完全一致，不能发生“换脸”或长相改变。\
         仅允许根据动作和表情指令进行自然的肌肉动态调整。"
            .to_string(),
    );
}

fn push_pose_and_scene_requirements(lines: &mut Vec<String>, params: &TryOnPromptParams) {
    lines.push(format!("   - 模特的动作调整为：{}。", params.pose));
    lines.push(format!("   - 模特的表情调整为：{}。", params.expression));
    lines.push("3. 场景与画质：".to_string());
    lines.push(format!("   - 背景环境：{}。", params.scene));
    lines.push("   - 风格：4K高清写实摄影，光影逼真，皮肤纹理自然。".to_string());
}

/// System instruction for the conversational stylist: persona, the
/// inventory grounding context, and the strict reference format.
pub fn advisor_system_instruction(inventory_context: &str) -> String {
    format!(
        "你是一位世界级的时尚造型师助手，名叫 {ADVISOR_PERSONA}。\n\n\
         这是你目前可以调用的服装库存：\n{inventory_context}\n\n\
         当用户询问建议或让你推荐衣服时，请从库存中挑选最合适的。\n\
         重要：如果你推荐了库存中的某件具体衣服，请务必在回复中包含该衣服的ID，\
         格式为：[[ID]]。\n\
         例如：“我觉得 [[c1]] 很适合你，或者你可以试试 [[f2]]。”\n\n\
         请务必使用中文回答，保持对话简短、时尚且有帮助。"
    )
}
