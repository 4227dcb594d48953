//! Posting to X (Twitter) through the v2 API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::TwitterCredentials;
use crate::models::truncate_chars;
use crate::oauth::{authorization_header, OAuthNonce};
use crate::{Config, Error, Result};

/// Fixed campaign teaser posted by the scheduled dispatcher.
pub const TEASER_TEXT: &str = "✨ Introducing AI-Generated Valentine's Gifts! 💕 Personalized love poems created just for you. Express your feelings with AI-powered romance. Sign up now! #ValentinesAI #AILove";

/// A social-posting capability.
#[async_trait]
pub trait SocialPoster: Send + Sync {
    /// Publish `text`, returning the id of the new post.
    async fn post(&self, text: &str) -> Result<String>;

    fn is_configured(&self) -> bool;
}

/// Placeholder used when the OAuth token set is incomplete.
pub struct UnconfiguredPoster;

#[async_trait]
impl SocialPoster for UnconfiguredPoster {
    async fn post(&self, _text: &str) -> Result<String> {
        Err(Error::NotConfigured("Twitter is not configured".to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// X API v2 client signing requests with OAuth 1.0a user context.
pub struct TwitterClient {
    client: reqwest::Client,
    credentials: TwitterCredentials,
    api_url: String,
}

impl TwitterClient {
    pub fn new(credentials: TwitterCredentials, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the poster the configuration allows.
    pub fn from_config(config: &Config) -> Arc<dyn SocialPoster> {
        match &config.twitter {
            Some(credentials) => Arc::new(Self::new(
                credentials.clone(),
                config.twitter_api_url.clone(),
            )),
            None => {
                warn!("Twitter credentials incomplete, social sharing disabled");
                Arc::new(UnconfiguredPoster)
            }
        }
    }
}

#[async_trait]
impl SocialPoster for TwitterClient {
    async fn post(&self, text: &str) -> Result<String> {
        let url = format!("{}/2/tweets", self.api_url);
        let authorization =
            authorization_header(&self.credentials, "POST", &url, &[], &OAuthNonce::generate())?;

        let response = self
            .client
            .post(&url)
            .header("authorization", authorization)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| Error::Dependency(format!("Tweet request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Dependency(format!("X API error {}: {}", status, body)));
        }

        let created: CreateTweetResponse = response
            .json()
            .await
            .map_err(|e| Error::Dependency(format!("Failed to parse tweet response: {}", e)))?;

        info!(tweet_id = %created.data.id, "Tweet posted");
        Ok(created.data.id)
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Text of the post announcing a newly generated poem.
pub fn share_text(prompt: &str, site_url: &str, preview_chars: usize) -> String {
    format!(
        "✨ New AI Valentine's Poem Generated! 💕\n\n{}...\n\nCreate your own: {}\n\n#ValentinesAI #Love",
        truncate_chars(prompt, preview_chars),
        site_url
    )
}

/// Public URL of a post.
pub fn tweet_url(tweet_id: &str) -> String {
    format!("https://x.com/i/web/status/{}", tweet_id)
}
