//! Notification and backend registration

use std::collections::HashSet;
use std::sync::Arc;

use notifier_core::{Id, NotifierError, NotifierResult};
use notifier_models::{Backend, Entity, Notification};
use tracing::debug;
use validator::Validate;

use crate::backends::BackendRegistry;
use crate::store::NotifierStore;

/// Backend input accepted by registration: a single name, a list of names,
/// or rows already fetched from the store
#[derive(Debug, Clone)]
pub enum BackendSelector {
    Name(String),
    Names(Vec<String>),
    Record(Backend),
    Records(Vec<Backend>),
}

impl From<&str> for BackendSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for BackendSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Vec<&str>> for BackendSelector {
    fn from(names: Vec<&str>) -> Self {
        Self::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for BackendSelector {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Backend> for BackendSelector {
    fn from(backend: Backend) -> Self {
        Self::Record(backend)
    }
}

impl From<Vec<Backend>> for BackendSelector {
    fn from(backends: Vec<Backend>) -> Self {
        Self::Records(backends)
    }
}

/// Permission input accepted by registration: a single code or a list
#[derive(Debug, Clone)]
pub enum PermissionSelector {
    Code(String),
    Codes(Vec<String>),
}

impl From<&str> for PermissionSelector {
    fn from(code: &str) -> Self {
        Self::Code(code.to_string())
    }
}

impl From<String> for PermissionSelector {
    fn from(code: String) -> Self {
        Self::Code(code)
    }
}

impl From<Vec<&str>> for PermissionSelector {
    fn from(codes: Vec<&str>) -> Self {
        Self::Codes(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for PermissionSelector {
    fn from(codes: Vec<String>) -> Self {
        Self::Codes(codes)
    }
}

/// Registration API for notification definitions and backend rows
pub struct Registry {
    store: Arc<dyn NotifierStore>,
}

impl Registry {
    pub fn new(store: Arc<dyn NotifierStore>) -> Self {
        Self { store }
    }

    /// Idempotent upsert of a notification definition
    ///
    /// Re-registering an existing name overwrites display name, visibility,
    /// permission set, and backend set. Omitted permissions default to none;
    /// omitted backends default to every currently-enabled backend.
    pub async fn register_notification(
        &self,
        name: &str,
        display_name: Option<&str>,
        permissions: Option<PermissionSelector>,
        backends: Option<BackendSelector>,
        public: bool,
    ) -> NotifierResult<Notification> {
        let display_name = display_name.unwrap_or(name);

        let backend_ids = match backends {
            Some(selector) => self.resolve_backends(selector).await?,
            None => self
                .store
                .list_enabled_backends()
                .await?
                .iter()
                .filter_map(|b| b.id)
                .collect(),
        };

        let permissions = match permissions {
            Some(selector) => resolve_permissions(selector)?,
            None => HashSet::new(),
        };

        let notification = match self.store.find_notification_by_name(name).await? {
            Some(mut existing) => {
                existing.display_name = display_name.to_string();
                existing.public = public;
                existing.permissions = permissions;
                existing.backend_ids = backend_ids;
                validate(&existing)?;
                self.store.update_notification(&existing).await?;
                existing
            }
            None => {
                let mut notification = Notification::new(name, display_name);
                notification.public = public;
                notification.permissions = permissions;
                notification.backend_ids = backend_ids;
                validate(&notification)?;
                self.store.insert_notification(&mut notification).await?;
                notification
            }
        };

        debug!(notification = %notification.name, "registered notification");
        Ok(notification)
    }

    /// Sync Backend rows from the registered delivery implementations
    ///
    /// Creates missing rows with `enabled = true`; refreshes display name
    /// and description on existing rows without touching `enabled`.
    pub async fn register_backends(
        &self,
        registry: &BackendRegistry,
    ) -> NotifierResult<Vec<Backend>> {
        let mut rows = Vec::new();
        for handler in registry.handlers() {
            let descriptor = handler.descriptor();
            let row = match self.store.find_backend_by_name(descriptor.name).await? {
                Some(mut existing) => {
                    existing.display_name = descriptor.display_name.to_string();
                    existing.description = descriptor.description.to_string();
                    self.store.update_backend(&existing).await?;
                    existing
                }
                None => {
                    let mut backend = Backend::new(descriptor.name, descriptor.display_name)
                        .with_description(descriptor.description);
                    self.store.insert_backend(&mut backend).await?;
                    backend
                }
            };
            debug!(backend = %row.name, enabled = row.enabled, "registered backend");
            rows.push(row);
        }
        Ok(rows)
    }

    async fn resolve_backends(&self, selector: BackendSelector) -> NotifierResult<HashSet<Id>> {
        let names = match selector {
            BackendSelector::Record(backend) => return record_ids(vec![backend]),
            BackendSelector::Records(backends) => return record_ids(backends),
            BackendSelector::Name(name) => vec![name],
            BackendSelector::Names(names) => names,
        };

        let mut ids = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                return Err(NotifierError::InvalidArgument {
                    message: "backend name must be a non-empty string".to_string(),
                });
            }
            let backend = self
                .store
                .find_backend_by_name(&name)
                .await?
                .ok_or_else(|| NotifierError::NotFound {
                    entity: Backend::TYPE_NAME,
                    field: "name",
                    value: name.clone(),
                })?;
            ids.insert(persisted_id(&backend)?);
        }
        Ok(ids)
    }
}

fn record_ids(backends: Vec<Backend>) -> NotifierResult<HashSet<Id>> {
    backends.iter().map(persisted_id).collect()
}

fn persisted_id(backend: &Backend) -> NotifierResult<Id> {
    backend.id.ok_or_else(|| NotifierError::InvalidArgument {
        message: format!("backend {} has not been saved", backend.name),
    })
}

fn resolve_permissions(selector: PermissionSelector) -> NotifierResult<HashSet<String>> {
    let codes = match selector {
        PermissionSelector::Code(code) => vec![code],
        PermissionSelector::Codes(codes) => codes,
    };

    let mut permissions = HashSet::new();
    for code in codes {
        if code.trim().is_empty() {
            return Err(NotifierError::InvalidArgument {
                message: "permission code must be a non-empty string".to_string(),
            });
        }
        permissions.insert(code);
    }
    Ok(permissions)
}

fn validate(notification: &Notification) -> NotifierResult<()> {
    notification
        .validate()
        .map_err(|e| NotifierError::InvalidArgument {
            message: e.to_string(),
        })
}
