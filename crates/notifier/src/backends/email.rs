//! Email delivery backend

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_core::config::EmailConfig;
use notifier_models::{Notification, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BackendDescriptor, Context, DeliveryBackend, TransportError};

/// Email errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

pub type EmailResult<T> = Result<T, EmailError>;

/// Email address with optional display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Format as RFC 5322
    pub fn to_rfc5322(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Outbound email message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub from: EmailAddress,
    pub to: EmailAddress,
    pub subject: String,
    pub text_body: String,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    pub fn new(
        from: EmailAddress,
        to: EmailAddress,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            subject: subject.into(),
            text_body: text_body.into(),
            created_at: Utc::now(),
        }
    }
}

/// Email transport trait; the host wires a real SMTP client here
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email, returning the transport message id
    async fn send(&self, message: &EmailMessage) -> EmailResult<String>;
}

/// Console email sender (for development)
pub struct ConsoleEmailSender;

impl Default for ConsoleEmailSender {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleEmailSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<String> {
        println!("=== EMAIL ===");
        println!("From: {}", message.from.to_rfc5322());
        println!("To: {}", message.to.to_rfc5322());
        println!("Subject: {}", message.subject);
        println!("---");
        println!("{}", message.text_body);
        println!("=============");

        Ok(message.id.clone())
    }
}

/// Email delivery backend
pub struct EmailBackend {
    from: EmailAddress,
    sender: Arc<dyn EmailSender>,
}

impl EmailBackend {
    pub const NAME: &'static str = "email";

    pub fn new(from: EmailAddress, sender: Arc<dyn EmailSender>) -> Self {
        Self { from, sender }
    }

    /// Console-backed instance from configuration
    pub fn console(config: &EmailConfig) -> Self {
        let from = EmailAddress::new(config.from_address.clone()).with_name(config.from_name.clone());
        Self::new(from, Arc::new(ConsoleEmailSender::new()))
    }

    fn render_subject(&self, notification: &Notification, context: Option<&Context>) -> String {
        let subject = context
            .and_then(|c| c.get("subject"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| notification.display_name.clone());

        // Header value must stay one line
        subject.lines().collect::<Vec<_>>().join(" ")
    }

    fn render_body(&self, notification: &Notification, context: Option<&Context>) -> String {
        context
            .and_then(|c| c.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "You have a new \"{}\" notification.",
                    notification.display_name
                )
            })
    }
}

#[async_trait]
impl DeliveryBackend for EmailBackend {
    fn descriptor(&self) -> BackendDescriptor {
        BackendDescriptor {
            name: Self::NAME,
            display_name: "Email",
            description: "Send via email",
        }
    }

    async fn send(
        &self,
        user: &User,
        notification: &Notification,
        context: Option<&Context>,
    ) -> Result<bool, TransportError> {
        if user.mail.is_empty() {
            return Err(TransportError::InvalidRecipient(format!(
                "user {} has no email address",
                user.login
            )));
        }

        let message = EmailMessage::new(
            self.from.clone(),
            EmailAddress::new(&user.mail),
            self.render_subject(notification, context),
            self.render_body(notification, context),
        );

        match self.sender.send(&message).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(user = %user.login, error = %e, "email delivery failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_backend() -> EmailBackend {
        let from = EmailAddress::new("notifier@example.com").with_name("Notifier");
        EmailBackend::new(from, Arc::new(ConsoleEmailSender::new()))
    }

    #[test]
    fn test_email_address_format() {
        let addr = EmailAddress::new("test@example.com").with_name("Test User");
        assert_eq!(addr.to_rfc5322(), "Test User <test@example.com>");

        let addr2 = EmailAddress::new("no-name@example.com");
        assert_eq!(addr2.to_rfc5322(), "no-name@example.com");
    }

    #[test]
    fn test_render_defaults_to_display_name() {
        let backend = test_backend();
        let notification = Notification::new("signup", "Welcome aboard");

        assert_eq!(backend.render_subject(&notification, None), "Welcome aboard");
        assert!(backend.render_body(&notification, None).contains("Welcome aboard"));
    }

    #[test]
    fn test_render_context_overrides() {
        let backend = test_backend();
        let notification = Notification::new("signup", "Welcome aboard");
        let context = json!({
            "subject": "Two\nlines",
            "message": "Custom body",
        });

        assert_eq!(backend.render_subject(&notification, Some(&context)), "Two lines");
        assert_eq!(backend.render_body(&notification, Some(&context)), "Custom body");
    }

    #[tokio::test]
    async fn test_send_via_console() {
        let backend = test_backend();
        let notification = Notification::new("signup", "Welcome aboard");
        let user = User::new(1, "user1", "user1@example.com");

        let delivered = backend.send(&user, &notification, None).await.unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn test_send_without_address() {
        let backend = test_backend();
        let notification = Notification::new("signup", "Welcome aboard");
        let user = User::new(1, "user1", "");

        let err = backend.send(&user, &notification, None).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRecipient(_)));
    }
}
