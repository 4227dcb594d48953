//! Email delivery over authenticated SMTP.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::SmtpSettings;
use crate::render::Artifact;
use crate::{Config, Error, Result};

pub const SUBJECT: &str = "Your AI-Generated Valentine's Poem 💝";

/// Fixed plain-text body of every poem email.
pub fn email_body(site_url: &str) -> String {
    format!(
        "Hello,\n\n\
         Your personalized AI-generated Valentine's poem has been created with love!\n\n\
         Check out our Valentine's AI at: {}\n\n\
         With love,\n\
         The AI Valentine's Team 💕\n",
        site_url
    )
}

/// An outgoing poem email.
#[derive(Debug, Clone)]
pub struct PoemEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Artifact>,
}

/// A mail delivery capability.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: PoemEmail) -> Result<()>;

    fn is_configured(&self) -> bool;
}

/// Placeholder used when no SMTP credentials are configured.
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _email: PoemEmail) -> Result<()> {
        Err(Error::NotConfigured("Email delivery is not configured".to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Build the MIME message for `email` sent from `from`.
pub fn build_message(from: &str, email: &PoemEmail) -> Result<Message> {
    let from: Mailbox = from
        .parse()
        .map_err(|e| Error::Config(format!("Invalid sender address: {}", e)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|_| Error::Validation("Invalid email address".to_string()))?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
    for artifact in &email.attachments {
        let content_type = ContentType::parse(artifact.content_type())
            .map_err(|e| Error::Internal(format!("Invalid content type: {}", e)))?;
        parts = parts.singlepart(Attachment::new(artifact.filename()).body(artifact.bytes.clone(), content_type));
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(parts)
        .map_err(|e| Error::Internal(format!("Failed to build email: {}", e)))
}

/// Submission port that upgrades a plain connection with STARTTLS.
pub const STARTTLS_PORT: u16 = 587;

/// Whether `port` speaks STARTTLS rather than implicit TLS.
pub fn uses_starttls(port: u16) -> bool {
    port == STARTTLS_PORT
}

/// Authenticated SMTP mailer: STARTTLS on port 587, implicit TLS elsewhere.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = if uses_starttls(settings.port) {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        };
        let transport = builder
            .map_err(|e| Error::Config(format!("Invalid SMTP host {}: {}", settings.host, e)))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: settings.username.clone(),
        })
    }

    /// Build the mailer the configuration allows.
    pub fn from_config(config: &Config) -> Arc<dyn Mailer> {
        match &config.smtp {
            Some(settings) => match Self::new(settings) {
                Ok(mailer) => Arc::new(mailer),
                Err(e) => {
                    warn!(error = %e, "SMTP transport unavailable, email delivery disabled");
                    Arc::new(UnconfiguredMailer)
                }
            },
            None => {
                warn!("GMAIL_USER / GMAIL_APP_PASSWORD not set, email delivery disabled");
                Arc::new(UnconfiguredMailer)
            }
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: PoemEmail) -> Result<()> {
        let message = build_message(&self.from, &email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Delivery(format!("Failed to send email: {}", e)))?;

        info!(attachments = email.attachments.len(), "Poem email sent");
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ArtifactFormat;

    fn artifact(format: ArtifactFormat, bytes: &[u8]) -> Artifact {
        Artifact {
            text: "poem".to_string(),
            format,
            theme: "roses",
            bytes: bytes.to_vec(),
        }
    }

    fn email(to: &str) -> PoemEmail {
        PoemEmail {
            to: to.to_string(),
            subject: SUBJECT.to_string(),
            body: email_body("https://example.com/"),
            attachments: vec![
                artifact(ArtifactFormat::Pdf, b"%PDF-1.3 test"),
                artifact(ArtifactFormat::Png, b"png-bytes"),
            ],
        }
    }

    #[test]
    fn test_body_mentions_site() {
        let body = email_body("https://example.com/");
        assert!(body.starts_with("Hello,\n\n"));
        assert!(body.contains("Check out our Valentine's AI at: https://example.com/"));
    }

    #[test]
    fn test_message_has_attachments() {
        let message = build_message("sender@example.com", &email("friend@example.com")).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("valentine_poem_roses.pdf"));
        assert!(raw.contains("valentine_poem_roses.png"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("image/png"));
        assert!(raw.contains("To: friend@example.com"));
    }

    #[test]
    fn test_unparseable_recipient_is_validation_error() {
        let err = build_message("sender@example.com", &email("not valid@")).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_smtp_mailer_builds() {
        let mailer = SmtpMailer::new(&SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: "sender@example.com".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();
        assert!(mailer.is_configured());
    }

    #[test]
    fn test_submission_port_uses_starttls() {
        assert!(uses_starttls(587));
        assert!(!uses_starttls(465));

        let mailer = SmtpMailer::new(&SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "sender@example.com".to_string(),
            password: "pw".to_string(),
        })
        .unwrap();
        assert!(mailer.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer() {
        let mailer = UnconfiguredMailer;
        assert!(!mailer.is_configured());
        let err = mailer.send(email("friend@example.com")).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
