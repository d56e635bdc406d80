//! Gemini API client.
//!
//! Three request shapes cross this boundary: schema-constrained
//! structured generation, multimodal image generation, and multi-turn
//! chat under a system instruction. Image payloads travel as raw base64
//! (see [`crate::imagery`]); the model is an untrusted collaborator, so
//! callers validate whatever comes back before treating it as data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeminiConfig;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("empty response from model")]
    EmptyResponse,
}

/// Inline binary payload: raw base64 with no data-URI prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One content part: either text or inline data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// An inline JPEG payload. `data` must already be raw base64.
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: data.into(),
            }),
        }
    }
}

/// A turn of content, optionally tagged with the speaker role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts,
        }
    }

    /// Untagged content, used for system instructions.
    pub fn bare(parts: Vec<Part>) -> Self {
        Self { role: None, parts }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate, if any text came back.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    /// The first inline image payload among the candidate's parts.
    pub fn inline_image(&self) -> Option<&str> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
            .next()
    }
}

/// The seam between the studio and the generative model. Implemented by
/// [`GeminiClient`]; tests substitute scripted stubs.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Schema-constrained structured generation. Returns the raw JSON
    /// text of the reply; the caller parses and validates it.
    async fn generate_structured(
        &self,
        parts: Vec<Part>,
        schema: Value,
    ) -> Result<String, GeminiError>;

    /// Multimodal generation that may return inline image data. The
    /// full response is returned so the caller can scan its parts.
    async fn generate_image(
        &self,
        parts: Vec<Part>,
    ) -> Result<GenerateContentResponse, GeminiError>;

    /// One conversational turn: prior history plus a new user message,
    /// under a system instruction. Returns the reply text.
    async fn chat(
        &self,
        system_instruction: &str,
        history: &[Content],
        message: &str,
    ) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        debug!(model, "sending generateContent request");

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini API error");
            return Err(GeminiError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate_structured(
        &self,
        parts: Vec<Part>,
        schema: Value,
    ) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema),
            }),
        };

        let response = self.generate(&self.text_model, &request).await?;
        response.text().ok_or(GeminiError::EmptyResponse)
    }

    async fn generate_image(
        &self,
        parts: Vec<Part>,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            system_instruction: None,
            generation_config: None,
        };

        self.generate(&self.image_model, &request).await
    }

    async fn chat(
        &self,
        system_instruction: &str,
        history: &[Content],
        message: &str,
    ) -> Result<String, GeminiError> {
        let mut contents = history.to_vec();
        contents.push(Content::user(vec![Part::text(message)]));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::bare(vec![Part::text(system_instruction)])),
            generation_config: None,
        };

        let response = self.generate(&self.text_model, &request).await?;
        response.text().ok_or(GeminiError::EmptyResponse)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend for exercising studio logic without the network.

    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct StubBackend {
        pub structured_reply: Mutex<Option<Result<String, GeminiError>>>,
        pub image_reply: Mutex<Option<Result<GenerateContentResponse, GeminiError>>>,
        pub chat_reply: Mutex<Option<Result<String, GeminiError>>>,
        /// Parts of the last generate_structured / generate_image call.
        pub seen_parts: Mutex<Vec<Part>>,
        /// System instruction and history length of the last chat call.
        pub seen_system: Mutex<Option<String>>,
        pub seen_history_len: Mutex<usize>,
    }

    impl StubBackend {
        pub fn with_structured(reply: &str) -> Self {
            let stub = Self::default();
            *stub.structured_reply.lock().unwrap() = Some(Ok(reply.to_string()));
            stub
        }

        pub fn with_image_response(response: GenerateContentResponse) -> Self {
            let stub = Self::default();
            *stub.image_reply.lock().unwrap() = Some(Ok(response));
            stub
        }

        pub fn with_chat(reply: &str) -> Self {
            let stub = Self::default();
            *stub.chat_reply.lock().unwrap() = Some(Ok(reply.to_string()));
            stub
        }

        /// A backend whose every call fails.
        pub fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl GenerativeBackend for StubBackend {
        async fn generate_structured(
            &self,
            parts: Vec<Part>,
            _schema: Value,
        ) -> Result<String, GeminiError> {
            *self.seen_parts.lock().unwrap() = parts;
            self.structured_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GeminiError::EmptyResponse))
        }

        async fn generate_image(
            &self,
            parts: Vec<Part>,
        ) -> Result<GenerateContentResponse, GeminiError> {
            *self.seen_parts.lock().unwrap() = parts;
            self.image_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GeminiError::EmptyResponse))
        }

        async fn chat(
            &self,
            system_instruction: &str,
            history: &[Content],
            _message: &str,
        ) -> Result<String, GeminiError> {
            *self.seen_system.lock().unwrap() = Some(system_instruction.to_string());
            *self.seen_history_len.lock().unwrap() = history.len();
            self.chat_reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GeminiError::EmptyResponse))
        }
    }

    /// A response whose first candidate carries one inline image part.
    pub fn image_response(data: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::model(vec![Part::jpeg(data)])),
            }],
        }
    }

    /// A response with text parts only (no image generated).
    pub fn text_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content::model(vec![Part::text(text)])),
            }],
        }
    }
}
