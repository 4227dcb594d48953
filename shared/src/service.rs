//! Request orchestration: validate, generate, deliver, share.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::DeliveryMode;
use crate::mail::{self, Mailer, PoemEmail, SmtpMailer};
use crate::models::{
    truncate_chars, GeneratePoemResponse, HealthResponse, PoemRequest, SocialPostRecord,
};
use crate::poet::{OpenAiCompleter, PoemGenerator, PoemSource};
use crate::render::{Artifact, ArtifactFormat, Renderer};
use crate::social::{self, SocialPoster, TwitterClient};
use crate::themes;
use crate::tweet_log::TweetLog;
use crate::validation::{self, Recipient, ValidatedRequest};
use crate::{Config, Error, Result};

/// Everything one deployment needs to serve poem requests.
pub struct PoemService {
    config: Config,
    generator: PoemGenerator,
    renderer: Renderer,
    mailer: Arc<dyn Mailer>,
    poster: Arc<dyn SocialPoster>,
    tweet_log: TweetLog,
}

impl PoemService {
    pub fn new(
        config: Config,
        generator: PoemGenerator,
        renderer: Renderer,
        mailer: Arc<dyn Mailer>,
        poster: Arc<dyn SocialPoster>,
        tweet_log: TweetLog,
    ) -> Self {
        Self {
            config,
            generator,
            renderer,
            mailer,
            poster,
            tweet_log,
        }
    }

    /// Wire up the real integrations the configuration allows.
    pub fn from_config(config: Config) -> Self {
        let generator = PoemGenerator::new(OpenAiCompleter::from_config(&config));
        let renderer = Renderer::from_config(&config);
        let mailer = SmtpMailer::from_config(&config);
        let poster = TwitterClient::from_config(&config);
        let tweet_log = TweetLog::new(config.tweets_log.clone());

        Self::new(config, generator, renderer, mailer, poster, tweet_log)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle `POST /api/generate-poem`.
    pub async fn generate(&self, request: PoemRequest) -> Result<GeneratePoemResponse> {
        let mode = self.config.delivery_mode;
        let request = validation::validate(&request, mode)?;

        if mode == DeliveryMode::Email && !self.mailer.is_configured() {
            return Err(Error::NotConfigured(
                "Email credentials not configured".to_string(),
            ));
        }

        let theme = themes::resolve(request.theme.as_deref());
        let poem = self
            .generator
            .generate(&request.prompt, request.recipient.handle())
            .await;
        if poem.source == PoemSource::Fallback {
            info!("Serving fallback poem");
        }

        let mut message = match &request.recipient {
            Recipient::Email(address) => {
                self.deliver_email(address, &poem.text, theme).await?;
                format!("Poem generated and sent to {}!", address)
            }
            Recipient::Handle(handle) => format!(
                "Poem generated for {}! Download it as a PDF or PNG.",
                handle
            ),
        };

        let tweet_url = if request.share_on_social {
            self.share(&request).await
        } else {
            None
        };
        if let Some(url) = &tweet_url {
            message.push_str(&format!("\n\nAlso posted to Twitter: {}", url));
        }

        Ok(GeneratePoemResponse {
            success: true,
            message,
            poem: poem.text,
            theme: match mode {
                DeliveryMode::Download => Some(theme.name.to_string()),
                DeliveryMode::Email => None,
            },
            tweet_url,
        })
    }

    async fn deliver_email(&self, to: &str, poem: &str, theme: &'static themes::Theme) -> Result<()> {
        let mut attachments = vec![self.renderer.render(poem, ArtifactFormat::Pdf, theme).await?];
        if self.config.email_attach_image {
            attachments.push(self.renderer.render(poem, ArtifactFormat::Png, theme).await?);
        }

        let email = PoemEmail {
            to: to.to_string(),
            subject: mail::SUBJECT.to_string(),
            body: mail::email_body(&self.config.site_url),
            attachments,
        };

        self.mailer.send(email).await.map_err(|e| {
            error!(error = %e, "Email delivery failed");
            match e {
                Error::Validation(_) => e,
                _ => Error::Delivery("Failed to send email".to_string()),
            }
        })
    }

    /// Post the share text and log it. Never fails the request.
    async fn share(&self, request: &ValidatedRequest) -> Option<String> {
        if !self.poster.is_configured() {
            warn!("Share requested but Twitter is not configured");
            return None;
        }

        let text = social::share_text(
            &request.prompt,
            &self.config.site_url,
            self.config.share_preview_chars,
        );
        let tweet_id = match self.poster.post(&text).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Failed to post to Twitter");
                return None;
            }
        };
        let url = social::tweet_url(&tweet_id);

        let record = SocialPostRecord {
            timestamp: Utc::now().to_rfc3339(),
            poem_preview: truncate_chars(&request.prompt, self.config.log_preview_chars).to_string(),
            tweet_id,
            url: url.clone(),
        };
        if let Err(e) = self.tweet_log.append(record).await {
            error!(error = %e, path = %self.tweet_log.path().display(), "Failed to append tweet log");
        }

        Some(url)
    }

    /// Handle `POST /api/download-poem/{format}/{theme}`.
    pub async fn download(&self, format: &str, theme: &str, poem: &str) -> Result<Artifact> {
        let format: ArtifactFormat = format.parse()?;
        if poem.trim().is_empty() {
            return Err(Error::Validation("Poem text is required".to_string()));
        }

        self.renderer.render(poem, format, themes::resolve(Some(theme))).await
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            delivery_mode: self.config.delivery_mode.as_str().to_string(),
            background_mode: self.config.background_mode.as_str().to_string(),
            openai_configured: self.generator.is_configured(),
            twitter_configured: self.poster.is_configured(),
            email_configured: self.mailer.is_configured(),
            unsplash_configured: self.config.unsplash_configured(),
        }
    }

    pub fn theme_names(&self) -> Vec<&'static str> {
        themes::names()
    }

    pub async fn tweets(&self) -> Result<Vec<SocialPostRecord>> {
        self.tweet_log.load().await
    }

    /// Post the campaign teaser. Teasers are not logged.
    pub async fn post_teaser(&self) -> Result<String> {
        let tweet_id = self.poster.post(social::TEASER_TEXT).await?;
        Ok(social::tweet_url(&tweet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poet::UnconfiguredCompleter;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<PoemEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: PoemEmail) -> Result<()> {
            if self.fail {
                return Err(Error::Delivery("535 authentication failed".to_string()));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingPoster {
        posts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl SocialPoster for RecordingPoster {
        async fn post(&self, text: &str) -> Result<String> {
            if self.fail {
                return Err(Error::Dependency("rate limited".to_string()));
            }
            let mut posts = self.posts.lock().unwrap();
            posts.push(text.to_string());
            Ok(format!("{}", 1000 + posts.len()))
        }

        fn is_configured(&self) -> bool {
            true
        }
    }

    struct Fixture {
        service: PoemService,
        mailer: Arc<RecordingMailer>,
        poster: Arc<RecordingPoster>,
        _dir: TempDir,
    }

    fn fixture(mode: DeliveryMode, mailer: RecordingMailer, poster: RecordingPoster) -> Fixture {
        fixture_with(mode, false, mailer, poster)
    }

    fn fixture_with(
        mode: DeliveryMode,
        email_attach_image: bool,
        mailer: RecordingMailer,
        poster: RecordingPoster,
    ) -> Fixture {
        let dir = tempdir().unwrap();
        let config = Config {
            delivery_mode: mode,
            email_attach_image,
            assets_dir: dir.path().join("assets"),
            tweets_log: dir.path().join("tweets_log.json"),
            site_url: "https://example.com/".to_string(),
            ..Config::default()
        };
        let mailer = Arc::new(mailer);
        let poster = Arc::new(poster);
        let service = PoemService::new(
            config.clone(),
            PoemGenerator::new(Arc::new(UnconfiguredCompleter)),
            Renderer::from_config(&config),
            mailer.clone(),
            poster.clone(),
            TweetLog::new(config.tweets_log.clone()),
        );

        Fixture {
            service,
            mailer,
            poster,
            _dir: dir,
        }
    }

    fn request(recipient: &str, share: bool) -> PoemRequest {
        PoemRequest {
            prompt: "moonlit walks on the beach".to_string(),
            recipient: recipient.to_string(),
            theme: Some("sunset".to_string()),
            share_on_social: share,
        }
    }

    #[tokio::test]
    async fn test_email_delivery() {
        let f = fixture(DeliveryMode::Email, RecordingMailer::default(), RecordingPoster::default());

        let response = f.service.generate(request("love@example.com", false)).await.unwrap();
        assert!(response.success);
        assert_eq!(response.message, "Poem generated and sent to love@example.com!");
        assert!(response.poem.contains("moonlit walks on the beach"));
        assert!(response.tweet_url.is_none());

        let sent = f.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "love@example.com");
        assert_eq!(sent[0].subject, mail::SUBJECT);
        assert_eq!(sent[0].attachments.len(), 1);
        assert!(sent[0].attachments[0].bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_email_attaches_image_when_enabled() {
        let f = fixture_with(DeliveryMode::Email, true, RecordingMailer::default(), RecordingPoster::default());

        f.service.generate(request("love@example.com", false)).await.unwrap();

        let sent = f.mailer.sent.lock().unwrap();
        let attachments = &sent[0].attachments;
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].format, ArtifactFormat::Pdf);
        assert!(attachments[0].bytes.starts_with(b"%PDF"));
        assert_eq!(attachments[1].format, ArtifactFormat::Png);
        assert!(attachments[1].bytes.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(attachments[1].filename(), "valentine_poem_sunset.png");
    }

    #[tokio::test]
    async fn test_email_failure_is_delivery_error() {
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };
        let f = fixture(DeliveryMode::Email, mailer, RecordingPoster::default());

        let err = f.service.generate(request("love@example.com", true)).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email");
        assert_eq!(err.status_code(), 500);
        assert!(f.poster.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_mode_requires_mailer() {
        let dir = tempdir().unwrap();
        let config = Config {
            tweets_log: dir.path().join("tweets_log.json"),
            ..Config::default()
        };
        let service = PoemService::from_config(config);

        let err = service.generate(request("love@example.com", false)).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn test_validation_has_no_side_effects() {
        let f = fixture(DeliveryMode::Email, RecordingMailer::default(), RecordingPoster::default());

        let err = f.service.generate(request("not-an-email", true)).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email address");
        assert!(f.mailer.sent.lock().unwrap().is_empty());
        assert!(f.poster.posts.lock().unwrap().is_empty());
        assert!(f.service.tweets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_mode_signs_and_shares() {
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), RecordingPoster::default());

        let response = f.service.generate(request("cupid", true)).await.unwrap();
        assert!(response.poem.ends_with("\n\n- @cupid"));
        assert_eq!(response.theme.as_deref(), Some("sunset"));
        assert_eq!(response.tweet_url.as_deref(), Some("https://x.com/i/web/status/1001"));
        assert!(response
            .message
            .ends_with("\n\nAlso posted to Twitter: https://x.com/i/web/status/1001"));
        assert!(f.mailer.sent.lock().unwrap().is_empty());

        let posts = f.poster.posts.lock().unwrap().clone();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].contains("moonlit walks on the beach..."));

        let log = f.service.tweets().await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].tweet_id, "1001");
        assert_eq!(log[0].poem_preview, "moonlit walks on the beach");
    }

    #[tokio::test]
    async fn test_previews_are_truncated() {
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), RecordingPoster::default());
        let prompt = "x".repeat(120);
        let request = PoemRequest {
            prompt: prompt.clone(),
            recipient: "cupid".to_string(),
            theme: None,
            share_on_social: true,
        };

        f.service.generate(request).await.unwrap();

        let posts = f.poster.posts.lock().unwrap().clone();
        assert!(posts[0].contains(&format!("{}...", "x".repeat(100))));
        assert!(!posts[0].contains(&"x".repeat(101)));
        assert_eq!(f.service.tweets().await.unwrap()[0].poem_preview, "x".repeat(50));
    }

    #[tokio::test]
    async fn test_share_failure_is_suppressed() {
        let poster = RecordingPoster {
            fail: true,
            ..Default::default()
        };
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), poster);

        let response = f.service.generate(request("@cupid", true)).await.unwrap();
        assert!(response.success);
        assert!(response.tweet_url.is_none());
        assert!(!response.message.contains("Also posted"));
        assert!(f.service.tweets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_download_artifacts() {
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), RecordingPoster::default());

        let pdf = f.service.download("pdf", "vintage", "Roses are red").await.unwrap();
        assert!(pdf.bytes.starts_with(b"%PDF"));
        assert_eq!(pdf.filename(), "valentine_poem_vintage.pdf");

        let unknown_theme = f.service.download("png", "plaid", "Roses are red").await.unwrap();
        assert_eq!(unknown_theme.theme, "roses");

        let err = f.service.download("svg", "roses", "Roses are red").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid format");

        let err = f.service.download("pdf", "roses", "   ").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_teaser_is_not_logged() {
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), RecordingPoster::default());

        let url = f.service.post_teaser().await.unwrap();
        assert_eq!(url, "https://x.com/i/web/status/1001");
        assert_eq!(f.poster.posts.lock().unwrap()[0], social::TEASER_TEXT);
        assert!(f.service.tweets().await.unwrap().is_empty());
    }

    #[test]
    fn test_health() {
        let f = fixture(DeliveryMode::Download, RecordingMailer::default(), RecordingPoster::default());

        let health = f.service.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.delivery_mode, "download");
        assert_eq!(health.background_mode, "bundled");
        assert!(!health.openai_configured);
        assert!(health.twitter_configured);
        assert!(health.email_configured);
        assert_eq!(f.service.theme_names()[0], "roses");
    }
}
