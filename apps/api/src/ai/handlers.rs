//! Direct text-generation pass-through.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::GenerationParams;
use crate::plants::handlers::json_body;
use crate::plants::models::non_blank;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleRequest {
    pub prompt: Option<String>,
    pub model_name: Option<String>,
    pub generation_config: Option<GenerationConfigInput>,
}

/// Caller overrides; anything left out falls back to `GenerationParams::default()`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfigInput {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfigInput {
    fn resolve(&self) -> GenerationParams {
        let defaults = GenerationParams::default();
        GenerationParams::new(
            self.temperature.unwrap_or(defaults.temperature),
            self.max_output_tokens.unwrap_or(defaults.max_output_tokens),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateArticleResponse {
    pub success: bool,
    pub article: String,
}

/// POST /ai/generate-article
///
/// Unlike the field generators, failures here are surfaced: a safety block
/// is a 400, every other failure a 500.
pub async fn handle_generate_article(
    State(state): State<AppState>,
    payload: Result<Json<GenerateArticleRequest>, JsonRejection>,
) -> Result<Json<GenerateArticleResponse>, AppError> {
    let request = json_body(payload)?;
    let prompt = non_blank(request.prompt.as_deref())
        .ok_or_else(|| AppError::BadInput("prompt cannot be empty".to_string()))?;

    let llm = state.generators.text_generator().ok_or_else(|| {
        warn!("generate-article called without a configured Gemini key");
        AppError::GenerationFailed("Gemini API key is not configured".to_string())
    })?;

    let model = non_blank(request.model_name.as_deref()).unwrap_or(state.generators.model());
    let params = request
        .generation_config
        .as_ref()
        .map(GenerationConfigInput::resolve)
        .unwrap_or_default();

    info!(
        "Generating article with {model} (temperature {}, max {} tokens)",
        params.temperature, params.max_output_tokens
    );

    let article = llm
        .generate(prompt, model, params)
        .await?
        .ok_or_else(|| AppError::GenerationFailed("The model returned no text".to_string()))?;

    Ok(Json(GenerateArticleResponse {
        success: true,
        article,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_generation_config_keeps_defaults() {
        let request: GenerateArticleRequest = serde_json::from_value(serde_json::json!({
            "prompt": "Write about basil",
            "modelName": "gemini-pro",
            "generationConfig": { "maxOutputTokens": 512 }
        }))
        .unwrap();

        assert_eq!(request.model_name.as_deref(), Some("gemini-pro"));
        let params = request.generation_config.unwrap().resolve();
        assert_eq!(params, GenerationParams::new(0.7, 512));
    }

    #[test]
    fn test_missing_generation_config_uses_defaults() {
        let params = GenerationConfigInput::default().resolve();
        assert_eq!(params, GenerationParams::default());
    }
}
