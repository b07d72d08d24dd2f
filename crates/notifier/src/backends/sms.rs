//! SMS delivery backend

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_core::config::SmsConfig;
use notifier_models::{Notification, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BackendDescriptor, Context, DeliveryBackend, TransportError};

/// SMS errors
#[derive(Debug, Error)]
pub enum SmsError {
    #[error("Send failed: {0}")]
    SendFailed(String),
}

pub type SmsResult<T> = Result<T, SmsError>;

/// Outbound SMS message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsMessage {
    pub id: String,
    pub to: String,
    pub from: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl SmsMessage {
    pub fn new(to: impl Into<String>, from: Option<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            to: to.into(),
            from,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}

/// SMS transport trait; the host wires a carrier client here
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send a message, returning the transport message id
    async fn send(&self, message: &SmsMessage) -> SmsResult<String>;
}

/// Console SMS sender (for development)
pub struct ConsoleSmsSender;

impl Default for ConsoleSmsSender {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSmsSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsSender for ConsoleSmsSender {
    async fn send(&self, message: &SmsMessage) -> SmsResult<String> {
        println!("=== SMS ===");
        println!("To: {}", message.to);
        if let Some(ref from) = message.from {
            println!("From: {}", from);
        }
        println!("{}", message.body);
        println!("===========");

        Ok(message.id.clone())
    }
}

/// SMS delivery backend
pub struct SmsBackend {
    from_number: Option<String>,
    sender: Arc<dyn SmsSender>,
}

impl SmsBackend {
    pub const NAME: &'static str = "sms";

    pub fn new(from_number: Option<String>, sender: Arc<dyn SmsSender>) -> Self {
        Self {
            from_number,
            sender,
        }
    }

    /// Console-backed instance from configuration
    pub fn console(config: &SmsConfig) -> Self {
        Self::new(config.from_number.clone(), Arc::new(ConsoleSmsSender::new()))
    }

    fn render_body(&self, notification: &Notification, context: Option<&Context>) -> String {
        context
            .and_then(|c| c.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| notification.display_name.clone())
    }
}

#[async_trait]
impl DeliveryBackend for SmsBackend {
    fn descriptor(&self) -> BackendDescriptor {
        BackendDescriptor {
            name: Self::NAME,
            display_name: "SMS",
            description: "Send via SMS",
        }
    }

    async fn send(
        &self,
        user: &User,
        notification: &Notification,
        context: Option<&Context>,
    ) -> Result<bool, TransportError> {
        let Some(phone) = user.phone.as_deref() else {
            return Err(TransportError::InvalidRecipient(format!(
                "user {} has no phone number",
                user.login
            )));
        };

        let message = SmsMessage::new(
            phone,
            self.from_number.clone(),
            self.render_body(notification, context),
        );

        self.sender
            .send(&message)
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_backend() -> SmsBackend {
        SmsBackend::new(Some("+15550100".to_string()), Arc::new(ConsoleSmsSender::new()))
    }

    #[tokio::test]
    async fn test_send_via_console() {
        let backend = test_backend();
        let notification = Notification::new("alert", "Account alert");
        let user = User::new(1, "user1", "user1@example.com").with_phone("+15550199");

        let delivered = backend.send(&user, &notification, None).await.unwrap();
        assert!(delivered);
    }

    #[tokio::test]
    async fn test_send_without_phone() {
        let backend = test_backend();
        let notification = Notification::new("alert", "Account alert");
        let user = User::new(1, "user1", "user1@example.com");

        let err = backend.send(&user, &notification, None).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRecipient(_)));
    }

    #[test]
    fn test_render_body_from_context() {
        let backend = test_backend();
        let notification = Notification::new("alert", "Account alert");
        let context = json!({"message": "Your code is 123456"});

        assert_eq!(
            backend.render_body(&notification, Some(&context)),
            "Your code is 123456"
        );
    }
}
