//! OpenAI-compatible implementation of the text generator.
//!
//! Plain chat-completions call over HTTPS. Streaming is not used; the
//! assistant coordinator wants the whole reply before broadcasting it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{GenerationError, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.2;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

pub struct OpenAiTextGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTextGenerator {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Build from `OPENAI_API_KEY`, `OPENAI_BASE_URL` and
    /// `PARLOR_AGENT_MODEL`. A missing key is tolerated at startup; the
    /// first call then fails and takes the coordinator's failure path.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; assistant calls will fail");
        }
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("PARLOR_AGENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(base_url, api_key, model)
    }
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Malformed("response has no choices".to_string()))?;

        Ok(choice.message.content)
    }
}
