//! Try-on image generation.
//!
//! Unlike analysis there is no safe fallback image: a failed generation
//! propagates so the UI can show a retryable failure, leaving the
//! previously generated image untouched.

use tracing::debug;

use crate::catalog::{ClothingItem, Scene};
use crate::gemini::{GenerativeBackend, Part};
use crate::imagery;

use super::{StudioError, prompt};

/// How the garment is specified in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarmentSource {
    /// Custom upload with embedded image data: the request carries the
    /// user photo and the garment photo as two ordered image parts.
    ReferenceImage,
    /// Curated item: the request carries only the user photo, and the
    /// garment is described by its catalog name and text.
    Description,
}

impl GarmentSource {
    /// Only embedded image data triggers the two-image path. A custom
    /// item whose image is a remote URL still goes through text.
    pub fn for_item(item: &ClothingItem) -> Self {
        if item.is_custom && imagery::is_data_uri(&item.image) {
            GarmentSource::ReferenceImage
        } else {
            GarmentSource::Description
        }
    }
}

/// Assemble the multimodal request parts for one try-on.
pub fn build_request(
    photo: &str,
    item: &ClothingItem,
    scene: &Scene,
    pose: &str,
    expression: &str,
) -> Vec<Part> {
    let pose = if pose.trim().is_empty() {
        prompt::DEFAULT_POSE
    } else {
        pose
    };
    let expression = if expression.trim().is_empty() {
        prompt::DEFAULT_EXPRESSION
    } else {
        expression
    };

    let params = prompt::TryOnPromptParams {
        item,
        scene: &scene.prompt,
        pose,
        expression,
    };

    let mut parts = vec![Part::jpeg(imagery::strip_data_uri(photo))];
    match GarmentSource::for_item(item) {
        GarmentSource::ReferenceImage => {
            parts.push(Part::jpeg(imagery::strip_data_uri(&item.image)));
            parts.push(Part::text(prompt::try_on_with_garment_image(&params)));
        }
        GarmentSource::Description => {
            parts.push(Part::text(prompt::try_on_with_garment_text(&params)));
        }
    }
    parts
}

/// Run one try-on generation and return a displayable data-URI image.
pub async fn render(
    backend: &dyn GenerativeBackend,
    photo: &str,
    item: &ClothingItem,
    scene: &Scene,
    pose: &str,
    expression: &str,
) -> Result<String, StudioError> {
    debug!(item = %item.id, scene = %scene.id, "rendering try-on");

    let parts = build_request(photo, item, scene, pose, expression);
    let response = backend.generate_image(parts).await?;

    let image = response.inline_image().ok_or(StudioError::NoImage)?;
    Ok(imagery::wrap_jpeg(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ClothingCategory, find_scene};
    use crate::gemini::testing::{StubBackend, image_response, text_response};

    const PHOTO: &str = "data:image/jpeg;base64,UEhPVE8=";

    fn custom_item(image: &str) -> ClothingItem {
        ClothingItem {
            id: "custom-1".to_string(),
            name: "我的外套".to_string(),
            category: ClothingCategory::Custom,
            image: image.to_string(),
            description: "用户上传的自定义服装。".to_string(),
            is_custom: true,
        }
    }

    #[test]
    fn test_custom_item_with_data_uri_uses_reference_image() {
        let item = custom_item("data:image/jpeg;base64,R0FSTUVOVA==");
        assert_eq!(GarmentSource::for_item(&item), GarmentSource::ReferenceImage);
    }

    #[test]
    fn test_custom_item_with_remote_url_uses_description() {
        let item = custom_item("https://example.com/coat.jpg");
        assert_eq!(GarmentSource::for_item(&item), GarmentSource::Description);
    }

    #[test]
    fn test_curated_item_uses_description() {
        let catalog = Catalog::default();
        let item = catalog.find("c1").unwrap();
        assert_eq!(GarmentSource::for_item(item), GarmentSource::Description);
    }

    #[test]
    fn test_two_image_request_orders_photo_then_garment() {
        let item = custom_item("data:image/jpeg;base64,R0FSTUVOVA==");
        let scene = find_scene("sc1").unwrap();
        let parts = build_request(PHOTO, &item, scene, "", "");

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, "UEhPVE8=");
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "R0FSTUVOVA==");
        assert!(parts[2].text.as_ref().unwrap().contains("第二张图片"));
    }

    #[test]
    fn test_single_image_request_carries_photo_and_text_only() {
        let catalog = Catalog::default();
        let item = catalog.find("f1").unwrap();
        let scene = find_scene("sc3").unwrap();
        let parts = build_request(PHOTO, item, scene, "靠墙站立", "严肃");

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, "UEhPVE8=");
        let text = parts[1].text.as_ref().unwrap();
        assert!(text.contains(&item.name));
        assert!(text.contains("靠墙站立"));
        assert!(text.contains("严肃"));
        assert!(text.contains(&scene.prompt));
    }

    #[test]
    fn test_blank_pose_and_expression_fall_back_to_defaults() {
        let catalog = Catalog::default();
        let item = catalog.find("c1").unwrap();
        let scene = find_scene("sc1").unwrap();
        let parts = build_request(PHOTO, item, scene, "  ", "");

        let text = parts[1].text.as_ref().unwrap();
        assert!(text.contains(prompt::DEFAULT_POSE));
        assert!(text.contains(prompt::DEFAULT_EXPRESSION));
    }

    #[tokio::test]
    async fn test_render_wraps_returned_image() {
        let backend = StubBackend::with_image_response(image_response("SU1BR0U="));
        let catalog = Catalog::default();
        let item = catalog.find("c1").unwrap();
        let scene = find_scene("sc1").unwrap();

        let image = render(&backend, PHOTO, item, scene, "", "").await.unwrap();
        assert_eq!(image, "data:image/jpeg;base64,SU1BR0U=");
    }

    #[tokio::test]
    async fn test_render_without_image_part_is_a_generation_error() {
        let backend = StubBackend::with_image_response(text_response("抱歉，无法生成"));
        let catalog = Catalog::default();
        let item = catalog.find("c1").unwrap();
        let scene = find_scene("sc1").unwrap();

        let err = render(&backend, PHOTO, item, scene, "", "").await.unwrap_err();
        assert!(matches!(err, StudioError::NoImage));
    }

    #[tokio::test]
    async fn test_render_propagates_backend_failure() {
        let backend = StubBackend::failing();
        let catalog = Catalog::default();
        let item = catalog.find("c1").unwrap();
        let scene = find_scene("sc1").unwrap();

        let err = render(&backend, PHOTO, item, scene, "", "").await.unwrap_err();
        assert!(matches!(err, StudioError::Generation(_)));
    }
}
