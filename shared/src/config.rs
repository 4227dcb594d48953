//! Configuration management for Lambda functions.
//!
//! Every integration is optional: a missing credential disables the feature
//! that needs it instead of failing the cold start.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TWITTER_API_URL: &str = "https://api.twitter.com";
const DEFAULT_UNSPLASH_API_URL: &str = "https://api.unsplash.com";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_SITE_URL: &str = "https://valentine-poems.github.io/";
const DEFAULT_CAMPAIGN_PROMPT: &str = "Personalized AI-generated Valentine's Day love poems";
/// Trend context used in place of a live trends feed.
const DEFAULT_CAMPAIGN_TRENDS: &str = "Valentine's Day trends: High interest in personalized gifts, romantic experiences, and digital gifts.";

/// How a generated poem reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Email the rendered PDF to an address.
    #[default]
    Email,
    /// Return the poem; artifacts are fetched from the download endpoint.
    Download,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Email => "email",
            DeliveryMode::Download => "download",
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(DeliveryMode::Email),
            "download" => Ok(DeliveryMode::Download),
            other => Err(format!("unknown delivery mode: {}", other)),
        }
    }
}

/// Where theme backgrounds come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundMode {
    /// Search a photo API, falling back to bundled files.
    Remote,
    /// Bundled files only.
    #[default]
    Bundled,
}

impl BackgroundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundMode::Remote => "remote",
            BackgroundMode::Bundled => "bundled",
        }
    }
}

impl FromStr for BackgroundMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(BackgroundMode::Remote),
            "bundled" | "local" => Ok(BackgroundMode::Bundled),
            other => Err(format!("unknown background mode: {}", other)),
        }
    }
}

/// OAuth 1.0a token set for the X API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

/// SMTP sender identity and password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion API key; `None` means every poem uses the fallback template
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API
    pub openai_base_url: String,
    /// Completion model id
    pub openai_model: String,
    /// X API credentials
    pub twitter: Option<TwitterCredentials>,
    /// X API base URL
    pub twitter_api_url: String,
    /// Mail submission settings
    pub smtp: Option<SmtpSettings>,
    /// Attach the themed PNG next to the PDF in emails
    pub email_attach_image: bool,
    /// Unsplash access key for remote backgrounds
    pub unsplash_access_key: Option<String>,
    /// Unsplash API base URL
    pub unsplash_api_url: String,
    /// Timeout for the photo search and download
    pub background_timeout: Duration,
    pub delivery_mode: DeliveryMode,
    pub background_mode: BackgroundMode,
    /// Directory holding `backgrounds/` and `fonts/`
    pub assets_dir: PathBuf,
    /// Flat JSON file of social post records
    pub tweets_log: PathBuf,
    /// Public link printed on artifacts, emails and posts
    pub site_url: String,
    /// Characters of the prompt included in a social post
    pub share_preview_chars: usize,
    /// Characters of the prompt kept in a log record
    pub log_preview_chars: usize,
    /// Product brief the scheduled campaign ideates from
    pub campaign_prompt: String,
    /// Market context passed along with the campaign brief
    pub campaign_trends: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let twitter = match (
            get("TWITTER_API_KEY"),
            get("TWITTER_API_SECRET"),
            get("TWITTER_ACCESS_TOKEN"),
            get("TWITTER_ACCESS_SECRET"),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_secret)) => {
                Some(TwitterCredentials {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_secret,
                })
            }
            _ => None,
        };

        let smtp = match (get("GMAIL_USER"), get("GMAIL_APP_PASSWORD")) {
            (Some(username), Some(password)) => Some(SmtpSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or(get("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT),
                username,
                password,
            }),
            _ => None,
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            twitter,
            twitter_api_url: get("TWITTER_API_URL")
                .unwrap_or_else(|| DEFAULT_TWITTER_API_URL.to_string()),
            smtp,
            email_attach_image: parse_or(get("EMAIL_ATTACH_IMAGE"), "EMAIL_ATTACH_IMAGE", false),
            unsplash_access_key: get("UNSPLASH_ACCESS_KEY"),
            unsplash_api_url: get("UNSPLASH_API_URL")
                .unwrap_or_else(|| DEFAULT_UNSPLASH_API_URL.to_string()),
            background_timeout: Duration::from_secs(parse_or(
                get("BACKGROUND_TIMEOUT_SECS"),
                "BACKGROUND_TIMEOUT_SECS",
                5,
            )),
            delivery_mode: parse_or(get("DELIVERY_MODE"), "DELIVERY_MODE", DeliveryMode::default()),
            background_mode: parse_or(
                get("BACKGROUND_MODE"),
                "BACKGROUND_MODE",
                BackgroundMode::default(),
            ),
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
            tweets_log: get("TWEETS_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("tweets_log.json")),
            site_url: get("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            share_preview_chars: parse_or(get("SHARE_PREVIEW_CHARS"), "SHARE_PREVIEW_CHARS", 100),
            log_preview_chars: parse_or(get("LOG_PREVIEW_CHARS"), "LOG_PREVIEW_CHARS", 50),
            campaign_prompt: get("CAMPAIGN_PROMPT")
                .unwrap_or_else(|| DEFAULT_CAMPAIGN_PROMPT.to_string()),
            campaign_trends: get("CAMPAIGN_TRENDS")
                .unwrap_or_else(|| DEFAULT_CAMPAIGN_TRENDS.to_string()),
        }
    }

    pub fn default_smtp_host() -> String {
        DEFAULT_SMTP_HOST.to_string()
    }

    pub fn default_smtp_port() -> u16 {
        DEFAULT_SMTP_PORT
    }

    pub fn completion_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn twitter_configured(&self) -> bool {
        self.twitter.is_some()
    }

    pub fn email_configured(&self) -> bool {
        self.smtp.is_some()
    }

    pub fn unsplash_configured(&self) -> bool {
        self.unsplash_access_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Parse an optional value, warning and using the default when it is invalid.
fn parse_or<T>(value: Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => match raw.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "Invalid configuration value, using default");
                default
            }
        },
        None => default,
    }
}
