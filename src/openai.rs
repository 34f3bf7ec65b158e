use crate::config::Config;
use crate::error::ProviderError;
use crate::provider::{BatchRequest, TranslatedItem, TranslationProvider, TranslationResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// OpenAI Chat Completion request with a structured-output response format
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
    response_format: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

/// JSON schema enforcing `{"translations": [{"key", "translation"}]}`
fn response_format() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "translation_response",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "translations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "key": { "type": "string" },
                                "translation": { "type": "string" }
                            },
                            "required": ["key", "translation"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["translations"],
                "additionalProperties": false
            }
        }
    })
}

/// Translation provider backed by the OpenAI chat completions API
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            api_url: api_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            reqwest::Client::new(),
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
        )
    }

    fn build_request(&self, batch: &BatchRequest) -> ChatRequest {
        // Reasoning models don't support temperature - use reasoning_effort instead
        let is_reasoning = is_reasoning_model(&self.model);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: batch.system_prompt(),
                },
                Message {
                    role: "user".to_string(),
                    content: batch.user_prompt(),
                },
            ],
            temperature: if is_reasoning { None } else { Some(0.3) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
            response_format: response_format(),
        }
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    async fn translate(&self, batch: &BatchRequest) -> Result<Vec<TranslatedItem>, ProviderError> {
        let request = self.build_request(batch);

        debug!(
            "Requesting {} translations to {} from {}",
            batch.items.len(),
            batch.language_name,
            self.model
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Api { status, body });
        }

        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        let message = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(ProviderError::EmptyResponse)?;

        if let Some(refusal) = message.refusal {
            return Err(ProviderError::Refusal(refusal));
        }
        let content = message.content.ok_or(ProviderError::EmptyResponse)?;

        let parsed: TranslationResponse = serde_json::from_str(&content)?;
        Ok(parsed.translations)
    }
}
