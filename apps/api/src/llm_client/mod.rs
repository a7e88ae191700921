/// LLM Client: the single point of entry for all Gemini API calls in Herbarium.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Field generators and the pass-through endpoint depend on the `TextGenerator`
/// trait, never on `GeminiClient` itself.
///
/// One attempt per call. There is no retry loop here on purpose: a failed
/// generation degrades the field it was producing to its fallback.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod prompts;

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Error)]
pub enum LlmError {
    /// The upstream safety filter refused the prompt or the answer.
    #[error("generation blocked: {message} (reason: {reason})")]
    Blocked { reason: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub const fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(0.7, 2048)
    }
}

/// The text-generation capability.
///
/// `Ok(None)` means the upstream call succeeded but produced no usable text
/// and no block reason. Callers must handle it separately from `Err`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<Option<String>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    safety_settings: Vec<SafetySetting>,
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
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
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    /// Concatenates every text part of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }

    /// Classifies a successful HTTP response into text, block, or nothing.
    pub fn into_outcome(self) -> Result<Option<String>, LlmError> {
        if let Some(text) = self.text() {
            return Ok(Some(text));
        }

        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            let message = self
                .prompt_feedback
                .and_then(|f| f.block_reason_message)
                .unwrap_or_else(|| reason.clone());
            return Err(LlmError::Blocked { reason, message });
        }

        let safety_stop = self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("SAFETY");
        if safety_stop {
            return Err(LlmError::Blocked {
                reason: "SAFETY".to_string(),
                message: "candidate stopped by safety filter".to_string(),
            });
        }

        Ok(None)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Credential-bound Gemini client. Built once in `main` and shared through
/// `AppState`; holds no state besides the key and the HTTP connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        params: GenerationParams,
    ) -> Result<Option<String>, LlmError> {
        debug!(
            "Calling Gemini model {model} ({params:?}) with prompt: {:?}...",
            prompt.chars().take(100).collect::<String>()
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: BLOCK_THRESHOLD,
                })
                .collect(),
            generation_config: params,
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE_URL}/{model}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!("Gemini API returned {status}: {message}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GeminiResponse = serde_json::from_str(&body)?;

        match parsed.into_outcome() {
            Ok(Some(text)) => {
                debug!("Gemini returned {} characters", text.len());
                Ok(Some(text))
            }
            Ok(None) => {
                warn!("Gemini returned no usable text and no block reason");
                Ok(None)
            }
            Err(e) => {
                warn!("Gemini blocked the request: {e}");
                Err(e)
            }
        }
    }
}
