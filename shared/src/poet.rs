//! Poem generation through an OpenAI-compatible completion API.
//!
//! [`PoemGenerator`] never fails: when the completion service is missing,
//! unreachable or returns nothing usable, a fallback poem built around the
//! caller's prompt is returned instead.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::validation::normalize_handle;
use crate::{Config, Error, Result};

const SYSTEM_PROMPT: &str = "You are a romantic poet. Generate ONLY a short, beautiful Valentine's poem (8-12 lines). No explanations, no commentary, just the poem itself.";

/// A text-completion capability.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    /// Complete a single system + user exchange, returning the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    fn is_configured(&self) -> bool;
}

/// Placeholder used when no completion key is configured.
pub struct UnconfiguredCompleter;

#[async_trait]
impl TextCompleter for UnconfiguredCompleter {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(Error::NotConfigured("Completion API is not configured".to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for `POST {base_url}/chat/completions`.
pub struct OpenAiCompleter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Build the completer the configuration allows.
    pub fn from_config(config: &Config) -> Arc<dyn TextCompleter> {
        match &config.openai_api_key {
            Some(key) => Arc::new(Self::new(
                key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            )),
            None => {
                warn!("OPENAI_API_KEY not set, poems will use the fallback template");
                Arc::new(UnconfiguredCompleter)
            }
        }
    }
}

#[async_trait]
impl TextCompleter for OpenAiCompleter {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Dependency(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Dependency(format!(
                "Completion API error {}: {}",
                status, body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Dependency(format!("Failed to parse completion response: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Dependency("Completion response had no content".to_string()))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Where a poem's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoemSource {
    Model,
    Fallback,
}

/// Poem text tagged with its source.
#[derive(Debug, Clone)]
pub struct GeneratedPoem {
    pub text: String,
    pub source: PoemSource,
}

/// Generates poems, substituting the fallback template on any failure.
#[derive(Clone)]
pub struct PoemGenerator {
    completer: Arc<dyn TextCompleter>,
}

impl PoemGenerator {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }

    pub fn is_configured(&self) -> bool {
        self.completer.is_configured()
    }

    /// Generate a poem for `prompt`, signed with `handle` when given.
    pub async fn generate(&self, prompt: &str, handle: Option<&str>) -> GeneratedPoem {
        let user = format!("Write a romantic Valentine's poem based on: {}", prompt);

        let mut poem = match self.completer.complete(SYSTEM_PROMPT, &user).await {
            Ok(text) => {
                info!(chars = text.len(), "Poem generated by completion API");
                GeneratedPoem {
                    text,
                    source: PoemSource::Model,
                }
            }
            Err(e) => {
                warn!(error = %e, "Poem generation failed, using fallback template");
                GeneratedPoem {
                    text: fallback_poem(prompt),
                    source: PoemSource::Fallback,
                }
            }
        };

        if let Some(handle) = handle {
            poem.text = with_attribution(&poem.text, handle);
        }

        poem
    }
}

/// Deterministic poem used whenever the completion API cannot answer.
pub fn fallback_poem(prompt: &str) -> String {
    format!(
        "Roses are red, violets are blue,\n\
         Every heartbeat whispers of you.\n\
         {},\n\
         A love so tender, a love so true.\n\
         \n\
         Through every season, come rain or shine,\n\
         Your hand will always rest in mine.\n\
         Today and always, be my Valentine,\n\
         Forever yours, until the end of time.",
        prompt.trim()
    )
}

fn with_attribution(poem: &str, handle: &str) -> String {
    format!("{}\n\n- {}", poem.trim_end(), normalize_handle(handle))
}
