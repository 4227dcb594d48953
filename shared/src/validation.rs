//! Request validation for poem generation.

use crate::config::DeliveryMode;
use crate::models::PoemRequest;
use crate::{Error, Result};

/// Who the poem is for, checked against the active delivery mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Email address (email delivery)
    Email(String),
    /// Social handle, always stored with exactly one leading `@`
    Handle(String),
}

impl Recipient {
    pub fn handle(&self) -> Option<&str> {
        match self {
            Recipient::Handle(handle) => Some(handle),
            Recipient::Email(_) => None,
        }
    }
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub prompt: String,
    pub recipient: Recipient,
    pub theme: Option<String>,
    pub share_on_social: bool,
}

/// Validate a poem request for the given delivery mode.
pub fn validate(request: &PoemRequest, mode: DeliveryMode) -> Result<ValidatedRequest> {
    let prompt = request.prompt.trim();
    let recipient = request.recipient.trim();

    let recipient = match mode {
        DeliveryMode::Email => {
            if prompt.is_empty() || recipient.is_empty() {
                return Err(Error::Validation("Email and prompt are required".to_string()));
            }
            if !recipient.contains('@') {
                return Err(Error::Validation("Invalid email address".to_string()));
            }
            Recipient::Email(recipient.to_string())
        }
        DeliveryMode::Download => {
            if prompt.is_empty() || recipient.is_empty() {
                return Err(Error::Validation(
                    "Twitter handle and prompt are required".to_string(),
                ));
            }
            let bare = recipient.strip_prefix('@').unwrap_or(recipient);
            if !is_valid_handle(bare) {
                return Err(Error::Validation("Invalid Twitter handle".to_string()));
            }
            Recipient::Handle(normalize_handle(bare))
        }
    };

    Ok(ValidatedRequest {
        prompt: prompt.to_string(),
        recipient,
        theme: request
            .theme
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        share_on_social: request.share_on_social,
    })
}

fn is_valid_handle(bare: &str) -> bool {
    !bare.is_empty() && bare.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize a handle to carry exactly one leading `@`.
pub fn normalize_handle(handle: &str) -> String {
    format!("@{}", handle.trim().trim_start_matches('@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str, recipient: &str) -> PoemRequest {
        PoemRequest {
            prompt: prompt.to_string(),
            recipient: recipient.to_string(),
            ..Default::default()
        }
    }

    fn message(result: Result<ValidatedRequest>) -> String {
        match result {
            Err(Error::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_email_request() {
        let validated = validate(&request("  two hearts  ", " a@b.com "), DeliveryMode::Email).unwrap();
        assert_eq!(validated.prompt, "two hearts");
        assert_eq!(validated.recipient, Recipient::Email("a@b.com".to_string()));
        assert_eq!(validated.recipient.handle(), None);
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert_eq!(
            message(validate(&request("", "a@b.com"), DeliveryMode::Email)),
            "Email and prompt are required"
        );
        assert_eq!(
            message(validate(&request("poem", "   "), DeliveryMode::Email)),
            "Email and prompt are required"
        );
        assert_eq!(
            message(validate(&request("", "cupid"), DeliveryMode::Download)),
            "Twitter handle and prompt are required"
        );
    }

    #[test]
    fn test_invalid_email_rejected() {
        assert_eq!(
            message(validate(&request("Some poem", "not-an-email"), DeliveryMode::Email)),
            "Invalid email address"
        );
    }

    #[test]
    fn test_handles() {
        let validated = validate(&request("stars", "@cupid_99"), DeliveryMode::Download).unwrap();
        assert_eq!(validated.recipient, Recipient::Handle("@cupid_99".to_string()));

        let bare = validate(&request("stars", "cupid"), DeliveryMode::Download).unwrap();
        assert_eq!(bare.recipient.handle(), Some("@cupid"));

        for bad in ["@", "@@cupid", "cu-pid", "cupid!", "a@b.com"] {
            assert_eq!(
                message(validate(&request("stars", bad), DeliveryMode::Download)),
                "Invalid Twitter handle",
                "handle {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_blank_theme_dropped() {
        let mut req = request("stars", "a@b.com");
        req.theme = Some("  ".to_string());
        assert!(validate(&req, DeliveryMode::Email).unwrap().theme.is_none());

        req.theme = Some(" sunset ".to_string());
        assert_eq!(
            validate(&req, DeliveryMode::Email).unwrap().theme.as_deref(),
            Some("sunset")
        );
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("cupid"), "@cupid");
        assert_eq!(normalize_handle("@cupid"), "@cupid");
        assert_eq!(normalize_handle("@@cupid"), "@cupid");
    }
}
