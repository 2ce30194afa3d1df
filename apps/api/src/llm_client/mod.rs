//! Model Gateway — the single point of entry for all Gemini calls.
//!
//! ARCHITECTURAL RULE: No other module may call the model API directly.
//! All model interactions MUST go through `ModelGateway`.
//!
//! The gateway never fails towards its caller. Transport, auth and format
//! failures are rendered as `Error: ...` text, shaped exactly like a normal
//! reply; callers inspect content with `is_error_text` when they care.
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

/// Prefix of every failure payload produced by the gateway.
pub const ERROR_PREFIX: &str = "Error:";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API Key is required. Please set GOOGLE_API_KEY environment variable or provide via request.")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model returned no text (finish reason: {0})")]
    EmptyContent(String),

    #[error("invalid model name '{0}'")]
    InvalidModel(String),
}

/// Binary material attached to a model call.
#[derive(Debug, Clone)]
pub enum MediaAttachment {
    Image { mime_type: String, data: Bytes },
    Pdf(Bytes),
}

impl MediaAttachment {
    pub fn mime_type(&self) -> &str {
        match self {
            MediaAttachment::Image { mime_type, .. } => mime_type,
            MediaAttachment::Pdf(_) => "application/pdf",
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            MediaAttachment::Image { data, .. } | MediaAttachment::Pdf(data) => data,
        }
    }
}

/// One request to the model.
#[derive(Debug, Clone, Copy)]
pub struct ModelCall<'a> {
    pub prompt: &'a str,
    pub media: &'a [MediaAttachment],
    /// Shared background text, appended after the prompt when non-empty.
    pub context: Option<&'a str>,
    pub model: &'a str,
    /// Per-request key. Ignored when the server has its own key configured.
    pub credential: Option<&'a str>,
}

impl<'a> ModelCall<'a> {
    pub fn text(prompt: &'a str, model: &'a str, credential: Option<&'a str>) -> Self {
        Self {
            prompt,
            media: &[],
            context: None,
            model,
            credential,
        }
    }
}

/// Model name and optional per-request key, carried by every drafting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub model: String,
    pub credential: Option<String>,
}

impl ModelSettings {
    /// Text-only call with these settings.
    pub fn call<'a>(&'a self, prompt: &'a str) -> ModelCall<'a> {
        ModelCall::text(prompt, &self.model, self.credential.as_deref())
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends one call and returns the reply text, or `Error: ...` text on failure.
    async fn invoke(&self, call: ModelCall<'_>) -> String;
}

/// True when `text` is a failure payload produced by the gateway.
pub fn is_error_text(text: &str) -> bool {
    text.trim_start().starts_with(ERROR_PREFIX)
}

/// Model names travel as a URL path segment, so only `[A-Za-z0-9._-]` is allowed.
pub fn is_valid_model_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    pub usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_tokens: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    pub output_tokens: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn finish_reason(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The production gateway: Gemini `generateContent` over HTTPS.
/// One attempt per call; there is no retry or backoff.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()?,
            api_base: config.gemini_api_base.trim_end_matches('/').to_string(),
            api_key: config.google_api_key.clone(),
        })
    }

    /// Makes a raw call to the model, returning the parsed response object.
    pub async fn call(&self, call: ModelCall<'_>) -> Result<GenerateContentResponse, LlmError> {
        if !is_valid_model_name(call.model) {
            return Err(LlmError::InvalidModel(call.model.to_string()));
        }

        let api_key = self
            .api_key
            .as_deref()
            .or(call.credential.filter(|k| !k.trim().is_empty()))
            .ok_or(LlmError::MissingCredential)?;

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: build_parts(&call),
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.api_base, call.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Model call succeeded: model={}, prompt_tokens={}, output_tokens={}",
                call.model, usage.prompt_tokens, usage.output_tokens
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn invoke(&self, call: ModelCall<'_>) -> String {
        let result = match self.call(call).await {
            Ok(response) => response
                .text()
                .ok_or_else(|| LlmError::EmptyContent(response.finish_reason())),
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call to {} failed: {e}", call.model);
                format!("{ERROR_PREFIX} {e}")
            }
        }
    }
}

/// Orders request parts as prompt, background context, then media.
fn build_parts(call: &ModelCall<'_>) -> Vec<RequestPart> {
    let mut parts = vec![RequestPart::Text {
        text: call.prompt.to_string(),
    }];

    if let Some(context) = call.context.filter(|c| !c.trim().is_empty()) {
        parts.push(RequestPart::Text {
            text: prompts::context_block(context),
        });
    }

    parts.extend(call.media.iter().map(|m| RequestPart::InlineData {
        inline_data: InlineData {
            mime_type: m.mime_type().to_string(),
            data: STANDARD.encode(m.data()),
        },
    }));

    parts
}

// ────────────────────────────────────────────────────────────────────────────
// Test stub
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_key() -> GeminiClient {
        GeminiClient {
            client: Client::new(),
            api_base: "http://127.0.0.1:9".to_string(),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn test_missing_credential_becomes_error_text() {
        let client = client_without_key();
        let reply = client
            .invoke(ModelCall::text("hello", "gemini-2.5-pro", None))
            .await;
        assert!(is_error_text(&reply));
        assert!(reply.contains("API Key is required"));
    }

    #[tokio::test]
    async fn test_blank_request_credential_counts_as_missing() {
        let client = client_without_key();
        let reply = client
            .invoke(ModelCall::text("hello", "gemini-2.5-pro", Some("   ")))
            .await;
        assert!(reply.contains("API Key is required"));
    }

    #[tokio::test]
    async fn test_model_name_cannot_leave_models_path() {
        let client = GeminiClient {
            api_key: Some("server-key".to_string()),
            ..client_without_key()
        };
        let result = client
            .call(ModelCall::text("hello", "x/../../v1beta/files?", None))
            .await;
        assert!(matches!(result, Err(LlmError::InvalidModel(_))));
    }

    #[test]
    fn test_model_name_charset() {
        assert!(is_valid_model_name("gemini-2.5-pro"));
        assert!(is_valid_model_name("gemini_1.5-flash-002"));
        assert!(!is_valid_model_name(""));
        assert!(!is_valid_model_name("x/../files"));
        assert!(!is_valid_model_name("pro?alt=sse"));
        assert!(!is_valid_model_name("gemini pro"));
    }

    #[test]
    fn test_parts_order_prompt_context_media() {
        let media = vec![
            MediaAttachment::Pdf(Bytes::from_static(b"%PDF")),
            MediaAttachment::Image {
                mime_type: "image/png".to_string(),
                data: Bytes::from_static(b"png"),
            },
        ];
        let call = ModelCall {
            prompt: "PROMPT",
            media: &media,
            context: Some("resume text"),
            model: "m",
            credential: None,
        };
        let value = serde_json::to_value(build_parts(&call)).unwrap();
        assert_eq!(value[0]["text"], "PROMPT");
        assert!(value[1]["text"].as_str().unwrap().contains("resume text"));
        assert_eq!(value[2]["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(value[2]["inline_data"]["data"], STANDARD.encode(b"%PDF"));
        assert_eq!(value[3]["inline_data"]["mime_type"], "image/png");
    }

    #[test]
    fn test_blank_context_is_not_sent() {
        let call = ModelCall {
            prompt: "PROMPT",
            media: &[],
            context: Some("  \n"),
            model: "m",
            credential: None,
        };
        assert_eq!(build_parts(&call).len(), 1);
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("Hello world"));
        assert_eq!(parsed.usage.unwrap().output_tokens, 3);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(parsed.text().is_none());
        assert_eq!(parsed.finish_reason(), "unknown");
    }

    #[test]
    fn test_is_error_text() {
        assert!(is_error_text("Error: HTTP error: timeout"));
        assert!(is_error_text("  Error: x"));
        assert!(!is_error_text("An error-free paragraph."));
    }
}
