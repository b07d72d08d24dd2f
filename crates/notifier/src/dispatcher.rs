//! Delivery dispatch

use std::sync::Arc;

use notifier_core::{NotifierError, NotifierResult};
use notifier_models::{DeliveryRecord, Notification, User};
use tracing::{debug, warn};

use crate::backends::{BackendRegistry, Context};
use crate::resolver::PreferenceResolver;
use crate::store::NotifierStore;

/// Sends a notification to each user over every backend the preference
/// cascade resolves, recording one `DeliveryRecord` per attempt
pub struct Dispatcher {
    store: Arc<dyn NotifierStore>,
    backends: Arc<BackendRegistry>,
    resolver: PreferenceResolver,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn NotifierStore>, backends: Arc<BackendRegistry>) -> Self {
        Self {
            resolver: PreferenceResolver::new(store.clone()),
            store,
            backends,
        }
    }

    /// Deliver to every user sequentially
    ///
    /// Failures are isolated per (user, backend) pair: recorded, logged,
    /// never retried, and never abort the remaining work.
    pub async fn dispatch(
        &self,
        notification: &Notification,
        users: &[User],
        context: Option<&Context>,
    ) -> NotifierResult<()> {
        let notification_id = notification
            .id
            .ok_or_else(|| NotifierError::Storage("notification row has no id".to_string()))?;

        for user in users {
            let backends = self.resolver.resolve_backends(notification, user).await?;
            for backend in backends {
                let backend_id = backend
                    .id
                    .ok_or_else(|| NotifierError::Storage("backend row has no id".to_string()))?;

                let success = match self.backends.get(&backend.name) {
                    Some(handler) => match handler.send(user, notification, context).await {
                        Ok(delivered) => delivered,
                        Err(e) => {
                            warn!(
                                user = %user.login,
                                backend = %backend.name,
                                error = %e,
                                "delivery failed"
                            );
                            false
                        }
                    },
                    None => {
                        warn!(
                            backend = %backend.name,
                            "no delivery implementation registered for backend"
                        );
                        false
                    }
                };

                let mut record = if success {
                    DeliveryRecord::success(user.id, notification_id, backend_id)
                } else {
                    DeliveryRecord::failure(user.id, notification_id, backend_id)
                };
                self.store.insert_delivery(&mut record).await?;

                debug!(
                    user = %user.login,
                    backend = %backend.name,
                    success,
                    "recorded delivery"
                );
            }
        }

        Ok(())
    }
}
