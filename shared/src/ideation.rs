//! Product ideation for the scheduled campaign.

use std::sync::Arc;

use tracing::info;

use crate::poet::{OpenAiCompleter, TextCompleter};
use crate::{Config, Result};

const SYSTEM_PROMPT: &str = "You are an AI entrepreneur. Ideate a simple digital product (e.g., custom poem or image) based on the prompt and trends. Output: Product name, description, how to generate it.";

/// Asks the completion API for a product idea built from a brief and trend context.
pub struct ProductIdeator {
    completer: Arc<dyn TextCompleter>,
}

impl ProductIdeator {
    pub fn new(completer: Arc<dyn TextCompleter>) -> Self {
        Self { completer }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(OpenAiCompleter::from_config(config))
    }

    pub fn is_configured(&self) -> bool {
        self.completer.is_configured()
    }

    pub async fn ideate(&self, prompt: &str, trends: &str) -> Result<String> {
        let user = format!("Prompt: {}\nTrends: {}", prompt, trends);
        let idea = self.completer.complete(SYSTEM_PROMPT, &user).await?;

        info!(chars = idea.len(), "Product idea generated");
        Ok(idea)
    }
}
