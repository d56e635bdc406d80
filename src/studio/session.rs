//! Per-session studio state.
//!
//! A session owns exactly one original photo, one selected item, one
//! selected scene, one set of generation settings, and one transcript.
//! Nothing is persisted: sessions live in process memory and disappear
//! on reset or expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, SCENES, Scene};

use super::advisor::ChatMessage;
use super::analysis::AnalysisData;
use super::prompt;

/// User-editable try-on modifiers, passed through unmodified into every
/// generation request until changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub pose: String,
    pub expression: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            pose: prompt::DEFAULT_POSE.to_string(),
            expression: prompt::DEFAULT_EXPRESSION.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudioSession {
    id: String,
    created_at: DateTime<Utc>,
    pub catalog: Catalog,
    original_photo: Option<String>,
    selected_item: Option<String>,
    selected_scene: String,
    pub settings: GenerationSettings,
    pub transcript: Vec<ChatMessage>,
    pub analysis: AnalysisData,
    generated_image: Option<String>,
    /// Ticket of the most recently issued try-on request. Completions
    /// carrying an older ticket are stale and must be discarded.
    tryon_seq: u64,
}

impl StudioSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            catalog: Catalog::default(),
            original_photo: None,
            selected_item: None,
            selected_scene: SCENES[0].id.clone(),
            settings: GenerationSettings::default(),
            transcript: Vec::new(),
            analysis: AnalysisData::pending(),
            generated_image: None,
            tryon_seq: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn original_photo(&self) -> Option<&str> {
        self.original_photo.as_deref()
    }

    /// Set a new original photo. The previous analysis and generated
    /// image describe the old photo, so both revert to their initial
    /// state.
    pub fn set_photo(&mut self, photo: String) {
        self.original_photo = Some(photo);
        self.analysis = AnalysisData::pending();
        self.generated_image = None;
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.selected_item.as_deref()
    }

    /// Select a wardrobe item; unknown ids are rejected.
    pub fn select_item(&mut self, id: &str) -> bool {
        if self.catalog.find(id).is_some() {
            self.selected_item = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// The currently selected scene (defaults to the first scene).
    pub fn scene(&self) -> &'static Scene {
        crate::catalog::find_scene(&self.selected_scene).unwrap_or(&SCENES[0])
    }

    /// Select a backdrop; unknown ids are rejected.
    pub fn select_scene(&mut self, id: &str) -> bool {
        if crate::catalog::find_scene(id).is_some() {
            self.selected_scene = id.to_string();
            true
        } else {
            false
        }
    }

    pub fn generated_image(&self) -> Option<&str> {
        self.generated_image.as_deref()
    }

    /// Stamp a new try-on request. The returned ticket must be presented
    /// when the result arrives.
    pub fn begin_try_on(&mut self) -> u64 {
        self.tryon_seq += 1;
        self.tryon_seq
    }

    /// Apply a finished try-on. Returns false and leaves the image
    /// untouched when a newer request has been issued since `ticket`,
    /// so the displayed result always corresponds to the latest request.
    pub fn complete_try_on(&mut self, ticket: u64, image: String) -> bool {
        if ticket < self.tryon_seq {
            return false;
        }
        self.generated_image = Some(image);
        true
    }

    /// Reinitialize every field in one step. The session id survives;
    /// the ticket counter keeps counting so a try-on issued before the
    /// reset can no longer land.
    pub fn reset(&mut self) {
        self.catalog.clear_custom();
        self.original_photo = None;
        self.selected_item = None;
        self.selected_scene = SCENES[0].id.clone();
        self.settings = GenerationSettings::default();
        self.transcript.clear();
        self.analysis = AnalysisData::pending();
        self.generated_image = None;
        self.tryon_seq += 1;
    }
}

impl Default for StudioSession {
    fn default() -> Self {
        Self::new()
    }
}
