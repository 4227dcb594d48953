//! AWS Secrets Manager integration.
//!
//! A deployment can keep integration credentials in one JSON secret instead
//! of plain environment variables. Keys present in the secret override the
//! matching [`Config`] fields.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::{SmtpSettings, TwitterCredentials};
use crate::{Config, Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Integration credentials stored in Secrets Manager.
///
/// Field names mirror the environment variables they replace.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IntegrationSecrets {
    pub openai_api_key: Option<String>,
    pub twitter_api_key: Option<String>,
    pub twitter_api_secret: Option<String>,
    pub twitter_access_token: Option<String>,
    pub twitter_access_secret: Option<String>,
    pub gmail_user: Option<String>,
    pub gmail_app_password: Option<String>,
    pub unsplash_access_key: Option<String>,
}

impl IntegrationSecrets {
    /// Overlay these secrets onto a configuration.
    pub fn apply_to(self, config: &mut Config) {
        if let Some(key) = self.openai_api_key {
            config.openai_api_key = Some(key);
        }
        if let Some(key) = self.unsplash_access_key {
            config.unsplash_access_key = Some(key);
        }

        let twitter = config.twitter.take();
        let consumer_key = self
            .twitter_api_key
            .or_else(|| twitter.as_ref().map(|t| t.consumer_key.clone()));
        let consumer_secret = self
            .twitter_api_secret
            .or_else(|| twitter.as_ref().map(|t| t.consumer_secret.clone()));
        let access_token = self
            .twitter_access_token
            .or_else(|| twitter.as_ref().map(|t| t.access_token.clone()));
        let access_secret = self
            .twitter_access_secret
            .or_else(|| twitter.as_ref().map(|t| t.access_secret.clone()));
        config.twitter = match (consumer_key, consumer_secret, access_token, access_secret) {
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

        let smtp = config.smtp.take();
        let username = self
            .gmail_user
            .or_else(|| smtp.as_ref().map(|s| s.username.clone()));
        let password = self
            .gmail_app_password
            .or_else(|| smtp.as_ref().map(|s| s.password.clone()));
        config.smtp = match (username, password) {
            (Some(username), Some(password)) => {
                let (host, port) = smtp
                    .map(|s| (s.host, s.port))
                    .unwrap_or_else(|| (Config::default_smtp_host(), Config::default_smtp_port()));
                Some(SmtpSettings {
                    host,
                    port,
                    username,
                    password,
                })
            }
            _ => None,
        };
    }
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get integration credentials from Secrets Manager.
pub async fn get_integration_secrets(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<IntegrationSecrets> {
    let secret_string = get_secret(client, secret_arn).await?;

    serde_json::from_str(&secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse integration secrets: {}", e)))
}

/// Load configuration from the environment, then overlay the secret named by
/// `INTEGRATIONS_SECRET_ARN` if one is set.
///
/// A secret that cannot be read is logged and skipped; the environment
/// values still apply.
pub async fn load_config() -> Config {
    let mut config = Config::from_env();

    let Ok(secret_arn) = std::env::var("INTEGRATIONS_SECRET_ARN") else {
        return config;
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&aws_config);

    match get_integration_secrets(&client, &secret_arn).await {
        Ok(secrets) => secrets.apply_to(&mut config),
        Err(e) => tracing::warn!(error = %e, "Integration secret unavailable, using environment only"),
    }

    config
}
