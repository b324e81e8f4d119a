//! OpenAI-compatible Chat Completions backend with strict JSON schema output.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use ladle_core::error::body_snippet;
use ladle_core::{AppConfig, ConfigError, Error, Recipe};

use super::RecipeExtractor;
use super::normalize::parse_model_output;
use super::prompt::{SCHEMA_NAME, recipe_schema, system_prompt, user_message};

/// Connection settings for the model service.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl From<&AppConfig> for OpenAiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
            timeout: config.llm_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct StructuredRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    refusal: Option<String>,
}

/// [`RecipeExtractor`] backed by an OpenAI-compatible API.
pub struct OpenAiRecipeExtractor {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiRecipeExtractor {
    pub fn new(config: OpenAiConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> Result<&str, Error> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Missing {
                    field: "openai_api_key".into(),
                    hint: "Set LADLE_OPENAI_API_KEY environment variable".into(),
                }
                .into()
            })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn complete(&self, api_key: &str, request: &StructuredRequest<'_>) -> Result<String, Error> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::ExtractionFailed(format!("model request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ExtractionFailed(format!("failed to read model response: {e}")))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Configuration(format!("model API rejected credentials (status {})", status.as_u16())));
        }
        if !status.is_success() {
            return Err(Error::ExtractionFailed(format!(
                "model API returned status {}: {}",
                status.as_u16(),
                body_snippet(&body)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ExtractionFailed(format!("unexpected model response shape: {e}")))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| Error::ExtractionFailed("model response had no choices".to_string()))?;

        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(Error::ExtractionFailed(format!("model refused: {refusal}")));
        }

        message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::ExtractionFailed("no output from model".to_string()))
    }
}

#[async_trait]
impl RecipeExtractor for OpenAiRecipeExtractor {
    async fn extract_from_text(&self, text: &str, source_url: Option<&str>) -> Result<Recipe, Error> {
        let api_key = self.api_key()?;
        let start = Instant::now();

        let request = StructuredRequest {
            model: &self.config.model,
            messages: vec![
                WireMessage { role: "system", content: system_prompt() },
                WireMessage { role: "user", content: user_message(text, source_url) },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat { name: SCHEMA_NAME, strict: true, schema: recipe_schema() },
            },
        };

        let timeout = self.config.timeout;
        let content = match tokio::time::timeout(timeout, self.complete(api_key, &request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(Error::ExtractionFailed(format!(
                    "model request timed out after {}ms",
                    timeout.as_millis()
                )));
            }
        };

        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "model responded"
        );

        parse_model_output(&content, source_url)
    }
}
