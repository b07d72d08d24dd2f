//! Delivery backend capability interface and registry

pub mod email;
pub mod sms;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use notifier_core::config::NotifierConfig;
use notifier_core::{NotifierError, NotifierResult};
use notifier_models::{Notification, User};
use thiserror::Error;

pub use email::{ConsoleEmailSender, EmailBackend, EmailSender};
pub use sms::{ConsoleSmsSender, SmsBackend, SmsSender};

/// Template/context payload handed to delivery backends
pub type Context = serde_json::Value;

/// Transport-level delivery failure
///
/// Caught at the dispatcher boundary and recorded as a failed delivery;
/// never propagated to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Static identity of a delivery backend implementation
///
/// Backend rows are synced from these descriptors at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

/// Delivery capability, implemented once per transport
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    /// Identity used to key the registry and the stored Backend rows
    fn descriptor(&self) -> BackendDescriptor;

    /// Deliver `notification` to `user`
    ///
    /// `Ok(false)` and `Err(_)` both mean the attempt failed; the
    /// dispatcher records either outcome and moves on.
    async fn send(
        &self,
        user: &User,
        notification: &Notification,
        context: Option<&Context>,
    ) -> Result<bool, TransportError>;
}

/// Name-keyed table of delivery implementations
///
/// Built by the host at startup; every identifier in the configuration
/// must map to an implementation registered here.
pub struct BackendRegistry {
    handlers: HashMap<String, Arc<dyn DeliveryBackend>>,
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a delivery implementation under its descriptor name
    ///
    /// Registering the same name again replaces the previous handler.
    pub fn register(&mut self, handler: Arc<dyn DeliveryBackend>) {
        self.handlers
            .insert(handler.descriptor().name.to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DeliveryBackend>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn DeliveryBackend>> {
        self.handlers.values()
    }

    /// Build a registry of built-in backends from the configured list
    pub fn from_config(config: &NotifierConfig) -> NotifierResult<Self> {
        let mut registry = Self::new();
        for name in &config.backends {
            match name.as_str() {
                EmailBackend::NAME => {
                    registry.register(Arc::new(EmailBackend::console(&config.email)));
                }
                SmsBackend::NAME => {
                    registry.register(Arc::new(SmsBackend::console(&config.sms)));
                }
                other => {
                    return Err(NotifierError::Config(format!(
                        "unknown backend identifier: {other}"
                    )));
                }
            }
        }
        Ok(registry)
    }
}
