//! The studio: everything between UI state and the generative model.
//!
//! Request construction, response parsing, the conversation
//! orchestrator, and the reference-markup resolver live here. The
//! rendering layer and the model itself are external collaborators.

pub mod advisor;
pub mod analysis;
pub mod markup;
pub mod prompt;
pub mod session;
pub mod tryon;

pub use advisor::{ChatMessage, ChatRole};
pub use analysis::AnalysisData;
pub use markup::Segment;
pub use session::{GenerationSettings, StudioSession};

use crate::gemini::GeminiError;

/// Failure taxonomy for studio operations.
///
/// Analysis and chat failures are absorbed close to where they occur
/// (placeholder record, fallback reply); generation failures propagate
/// so the UI can show a retryable error.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("no image generated")]
    NoImage,

    #[error("try-on generation failed: {0}")]
    Generation(#[from] GeminiError),

    #[error("advisor call failed: {0}")]
    Chat(String),
}
