//! The conversational stylist.
//!
//! Each turn forwards the full prior transcript plus the new message
//! under a system instruction that embeds the inventory grounding
//! context. Chat is best-effort: a failed call degrades to a fixed
//! apology appended as the model's turn, and no error escapes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Catalog;
use crate::gemini::{Content, GenerativeBackend, Part};

use super::{StudioError, prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    fn as_wire(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Produce the advisor's reply to `message` given the prior transcript.
/// Failures degrade to [`prompt::ADVISOR_FALLBACK_REPLY`].
pub async fn reply(
    backend: &dyn GenerativeBackend,
    catalog: &Catalog,
    transcript: &[ChatMessage],
    message: &str,
) -> String {
    match try_reply(backend, catalog, transcript, message).await {
        Ok(text) => text,
        Err(e) => {
            warn!("{e}");
            prompt::ADVISOR_FALLBACK_REPLY.to_string()
        }
    }
}

/// One full advisor turn: obtain the reply and append both the user
/// message and the model turn to the transcript.
pub async fn take_turn(
    backend: &dyn GenerativeBackend,
    catalog: &Catalog,
    transcript: &mut Vec<ChatMessage>,
    message: &str,
) -> String {
    let text = reply(backend, catalog, transcript, message).await;
    transcript.push(ChatMessage::user(message));
    transcript.push(ChatMessage::model(text.clone()));
    text
}

async fn try_reply(
    backend: &dyn GenerativeBackend,
    catalog: &Catalog,
    transcript: &[ChatMessage],
    message: &str,
) -> Result<String, StudioError> {
    let system = prompt::advisor_system_instruction(&catalog.grounding_context());

    let history: Vec<Content> = transcript
        .iter()
        .map(|m| Content {
            role: Some(m.role.as_wire().to_string()),
            parts: vec![Part::text(m.text.as_str())],
        })
        .collect();

    backend
        .chat(&system, &history, message)
        .await
        .map_err(|e| StudioError::Chat(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::testing::StubBackend;

    #[tokio::test]
    async fn test_turn_appends_user_and_model_messages() {
        let backend = StubBackend::with_chat("试试 [[c1]] 吧！");
        let catalog = Catalog::default();
        let mut transcript = Vec::new();

        let text = take_turn(&backend, &catalog, &mut transcript, "推荐一套休闲装").await;

        assert_eq!(text, "试试 [[c1]] 吧！");
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], ChatMessage::user("推荐一套休闲装"));
        assert_eq!(transcript[1], ChatMessage::model("试试 [[c1]] 吧！"));
    }

    #[tokio::test]
    async fn test_failed_call_appends_exactly_one_fallback_turn() {
        let backend = StubBackend::failing();
        let catalog = Catalog::default();
        let mut transcript = vec![ChatMessage::user("之前的提问")];

        let text = take_turn(&backend, &catalog, &mut transcript, "现在呢？").await;

        assert_eq!(text, prompt::ADVISOR_FALLBACK_REPLY);
        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.last().unwrap(),
            &ChatMessage::model(prompt::ADVISOR_FALLBACK_REPLY)
        );
    }

    #[tokio::test]
    async fn test_system_instruction_embeds_inventory() {
        let backend = StubBackend::with_chat("好的");
        let catalog = Catalog::default();
        let mut transcript = Vec::new();

        take_turn(&backend, &catalog, &mut transcript, "你好").await;

        let system = backend.seen_system.lock().unwrap().clone().unwrap();
        assert!(system.contains(prompt::ADVISOR_PERSONA));
        assert!(system.contains("- ID: c1,"));
    }

    #[tokio::test]
    async fn test_prior_transcript_is_forwarded() {
        let backend = StubBackend::with_chat("继续聊");
        let catalog = Catalog::default();
        let mut transcript = vec![
            ChatMessage::user("第一问"),
            ChatMessage::model("第一答"),
        ];

        take_turn(&backend, &catalog, &mut transcript, "第二问").await;

        assert_eq!(*backend.seen_history_len.lock().unwrap(), 2);
    }
}
