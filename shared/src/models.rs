//! Shared data models.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-poem`.
///
/// The recipient arrives under whichever name the front end of a given
/// deployment uses: `email`, `handle` or `twitter_handle`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoemRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, alias = "email", alias = "handle", alias = "twitter_handle")]
    pub recipient: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default, rename = "share_on_twitter", alias = "share_on_social")]
    pub share_on_social: bool,
}

/// Successful response of `POST /api/generate-poem`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePoemResponse {
    pub success: bool,
    pub message: String,
    pub poem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_url: Option<String>,
}

/// Body of `POST /api/download-poem/{format}/{theme}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub poem: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub delivery_mode: String,
    pub background_mode: String,
    pub openai_configured: bool,
    pub twitter_configured: bool,
    pub email_configured: bool,
    pub unsplash_configured: bool,
}

/// One successful social post, as persisted in the tweet log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPostRecord {
    /// RFC 3339 time of the post
    pub timestamp: String,
    /// Prompt text truncated to the log preview length
    pub poem_preview: String,
    pub tweet_id: String,
    pub url: String,
}

/// Truncate to at most `max_chars` characters, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
