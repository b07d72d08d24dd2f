//! Storage interface and in-memory reference store
//!
//! The host application injects the production implementation; `MemoryStore`
//! backs tests and development. The store owns exactly five tables:
//! backends, notifications, user preferences, group preferences, and
//! delivery records.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use notifier_core::{Id, NotifierError, NotifierResult};
use notifier_models::{
    Backend, DeliveryRecord, Entity, GroupPreference, Notification, UserPreference,
};
use tokio::sync::RwLock;

/// Storage abstraction for the notifier tables
#[async_trait]
pub trait NotifierStore: Send + Sync {
    // Backends

    /// Insert a backend row, assigning its id
    async fn insert_backend(&self, backend: &mut Backend) -> NotifierResult<Id>;

    /// Update a backend row; the name is immutable
    async fn update_backend(&self, backend: &Backend) -> NotifierResult<()>;

    async fn find_backend(&self, id: Id) -> NotifierResult<Option<Backend>>;

    async fn find_backend_by_name(&self, name: &str) -> NotifierResult<Option<Backend>>;

    async fn list_backends(&self) -> NotifierResult<Vec<Backend>>;

    async fn list_enabled_backends(&self) -> NotifierResult<Vec<Backend>>;

    /// Delete a backend row
    ///
    /// Fails with `ProtectedDeletion` while any notification, preference,
    /// or delivery record references the backend.
    async fn delete_backend(&self, id: Id) -> NotifierResult<()>;

    // Notifications

    async fn insert_notification(&self, notification: &mut Notification) -> NotifierResult<Id>;

    async fn update_notification(&self, notification: &Notification) -> NotifierResult<()>;

    async fn find_notification_by_name(&self, name: &str) -> NotifierResult<Option<Notification>>;

    async fn list_public_notifications(&self) -> NotifierResult<Vec<Notification>>;

    // User preferences

    async fn find_user_preference(
        &self,
        user_id: Id,
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Option<UserPreference>>;

    async fn insert_user_preference(&self, pref: &mut UserPreference) -> NotifierResult<Id>;

    async fn update_user_preference(&self, pref: &UserPreference) -> NotifierResult<()>;

    /// Remove every per-user preference row for the given users, returning
    /// the number of rows deleted
    async fn delete_user_preferences(&self, user_ids: &[Id]) -> NotifierResult<usize>;

    // Group preferences

    async fn find_group_preference(
        &self,
        group_id: Id,
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Option<GroupPreference>>;

    /// Rows for (notification, backend) across any of the given groups
    async fn find_group_preferences(
        &self,
        group_ids: &[Id],
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Vec<GroupPreference>>;

    async fn insert_group_preference(&self, pref: &mut GroupPreference) -> NotifierResult<Id>;

    async fn update_group_preference(&self, pref: &GroupPreference) -> NotifierResult<()>;

    // Delivery records

    async fn insert_delivery(&self, record: &mut DeliveryRecord) -> NotifierResult<Id>;

    async fn list_deliveries_for_user(&self, user_id: Id) -> NotifierResult<Vec<DeliveryRecord>>;
}

/// In-memory store for development and testing
pub struct MemoryStore {
    backends: RwLock<Vec<Backend>>,
    notifications: RwLock<Vec<Notification>>,
    user_prefs: RwLock<Vec<UserPreference>>,
    group_prefs: RwLock<Vec<GroupPreference>>,
    deliveries: RwLock<Vec<DeliveryRecord>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            backends: RwLock::new(Vec::new()),
            notifications: RwLock::new(Vec::new()),
            user_prefs: RwLock::new(Vec::new()),
            group_prefs: RwLock::new(Vec::new()),
            deliveries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl NotifierStore for MemoryStore {
    async fn insert_backend(&self, backend: &mut Backend) -> NotifierResult<Id> {
        let mut backends = self.backends.write().await;
        if backends.iter().any(|b| b.name == backend.name) {
            return Err(NotifierError::Conflict {
                message: format!("backend name already taken: {}", backend.name),
            });
        }

        let id = self.next_id();
        let now = Utc::now();
        backend.id = Some(id);
        backend.created_at = Some(now);
        backend.updated_at = Some(now);
        backends.push(backend.clone());

        Ok(id)
    }

    async fn update_backend(&self, backend: &Backend) -> NotifierResult<()> {
        let mut backends = self.backends.write().await;
        let pos = backends
            .iter()
            .position(|b| b.id == backend.id)
            .ok_or_else(|| NotifierError::NotFound {
                entity: Backend::TYPE_NAME,
                field: "id",
                value: format!("{:?}", backend.id),
            })?;

        if backends[pos].name != backend.name {
            return Err(NotifierError::Conflict {
                message: "backend name is immutable".to_string(),
            });
        }

        let mut updated = backend.clone();
        updated.updated_at = Some(Utc::now());
        backends[pos] = updated;
        Ok(())
    }

    async fn find_backend(&self, id: Id) -> NotifierResult<Option<Backend>> {
        let backends = self.backends.read().await;
        Ok(backends.iter().find(|b| b.id == Some(id)).cloned())
    }

    async fn find_backend_by_name(&self, name: &str) -> NotifierResult<Option<Backend>> {
        let backends = self.backends.read().await;
        Ok(backends.iter().find(|b| b.name == name).cloned())
    }

    async fn list_backends(&self) -> NotifierResult<Vec<Backend>> {
        let backends = self.backends.read().await;
        Ok(backends.clone())
    }

    async fn list_enabled_backends(&self) -> NotifierResult<Vec<Backend>> {
        let backends = self.backends.read().await;
        Ok(backends.iter().filter(|b| b.enabled).cloned().collect())
    }

    async fn delete_backend(&self, id: Id) -> NotifierResult<()> {
        let mut backends = self.backends.write().await;
        let backend = backends
            .iter()
            .find(|b| b.id == Some(id))
            .cloned()
            .ok_or_else(|| NotifierError::NotFound {
                entity: Backend::TYPE_NAME,
                field: "id",
                value: id.to_string(),
            })?;

        let referenced = {
            let notifications = self.notifications.read().await;
            let user_prefs = self.user_prefs.read().await;
            let group_prefs = self.group_prefs.read().await;
            let deliveries = self.deliveries.read().await;

            notifications.iter().any(|n| n.backend_ids.contains(&id))
                || user_prefs.iter().any(|p| p.backend_id == id)
                || group_prefs.iter().any(|p| p.backend_id == id)
                || deliveries.iter().any(|d| d.backend_id == id)
        };

        if referenced {
            return Err(NotifierError::ProtectedDeletion { name: backend.name });
        }

        backends.retain(|b| b.id != Some(id));
        Ok(())
    }

    async fn insert_notification(&self, notification: &mut Notification) -> NotifierResult<Id> {
        let mut notifications = self.notifications.write().await;
        if notifications.iter().any(|n| n.name == notification.name) {
            return Err(NotifierError::Conflict {
                message: format!("notification name already taken: {}", notification.name),
            });
        }

        let id = self.next_id();
        let now = Utc::now();
        notification.id = Some(id);
        notification.created_at = Some(now);
        notification.updated_at = Some(now);
        notifications.push(notification.clone());

        Ok(id)
    }

    async fn update_notification(&self, notification: &Notification) -> NotifierResult<()> {
        let mut notifications = self.notifications.write().await;
        let pos = notifications
            .iter()
            .position(|n| n.id == notification.id)
            .ok_or_else(|| NotifierError::NotFound {
                entity: Notification::TYPE_NAME,
                field: "id",
                value: format!("{:?}", notification.id),
            })?;

        let mut updated = notification.clone();
        updated.updated_at = Some(Utc::now());
        notifications[pos] = updated;
        Ok(())
    }

    async fn find_notification_by_name(&self, name: &str) -> NotifierResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().find(|n| n.name == name).cloned())
    }

    async fn list_public_notifications(&self) -> NotifierResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().filter(|n| n.public).cloned().collect())
    }

    async fn find_user_preference(
        &self,
        user_id: Id,
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Option<UserPreference>> {
        let user_prefs = self.user_prefs.read().await;
        Ok(user_prefs
            .iter()
            .find(|p| {
                p.user_id == user_id
                    && p.notification_id == notification_id
                    && p.backend_id == backend_id
            })
            .cloned())
    }

    async fn insert_user_preference(&self, pref: &mut UserPreference) -> NotifierResult<Id> {
        let mut user_prefs = self.user_prefs.write().await;
        let duplicate = user_prefs.iter().any(|p| {
            p.user_id == pref.user_id
                && p.notification_id == pref.notification_id
                && p.backend_id == pref.backend_id
        });
        if duplicate {
            return Err(NotifierError::Conflict {
                message: "user preference row already exists".to_string(),
            });
        }

        let id = self.next_id();
        let now = Utc::now();
        pref.id = Some(id);
        pref.created_at = Some(now);
        pref.updated_at = Some(now);
        user_prefs.push(pref.clone());

        Ok(id)
    }

    async fn update_user_preference(&self, pref: &UserPreference) -> NotifierResult<()> {
        let mut user_prefs = self.user_prefs.write().await;
        let pos = user_prefs
            .iter()
            .position(|p| p.id == pref.id)
            .ok_or_else(|| NotifierError::NotFound {
                entity: UserPreference::TYPE_NAME,
                field: "id",
                value: format!("{:?}", pref.id),
            })?;

        let mut updated = pref.clone();
        updated.updated_at = Some(Utc::now());
        user_prefs[pos] = updated;
        Ok(())
    }

    async fn delete_user_preferences(&self, user_ids: &[Id]) -> NotifierResult<usize> {
        let mut user_prefs = self.user_prefs.write().await;
        let before = user_prefs.len();
        user_prefs.retain(|p| !user_ids.contains(&p.user_id));
        Ok(before - user_prefs.len())
    }

    async fn find_group_preference(
        &self,
        group_id: Id,
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Option<GroupPreference>> {
        let group_prefs = self.group_prefs.read().await;
        Ok(group_prefs
            .iter()
            .find(|p| {
                p.group_id == group_id
                    && p.notification_id == notification_id
                    && p.backend_id == backend_id
            })
            .cloned())
    }

    async fn find_group_preferences(
        &self,
        group_ids: &[Id],
        notification_id: Id,
        backend_id: Id,
    ) -> NotifierResult<Vec<GroupPreference>> {
        let group_prefs = self.group_prefs.read().await;
        Ok(group_prefs
            .iter()
            .filter(|p| {
                group_ids.contains(&p.group_id)
                    && p.notification_id == notification_id
                    && p.backend_id == backend_id
            })
            .cloned()
            .collect())
    }

    async fn insert_group_preference(&self, pref: &mut GroupPreference) -> NotifierResult<Id> {
        let mut group_prefs = self.group_prefs.write().await;
        let duplicate = group_prefs.iter().any(|p| {
            p.group_id == pref.group_id
                && p.notification_id == pref.notification_id
                && p.backend_id == pref.backend_id
        });
        if duplicate {
            return Err(NotifierError::Conflict {
                message: "group preference row already exists".to_string(),
            });
        }

        let id = self.next_id();
        let now = Utc::now();
        pref.id = Some(id);
        pref.created_at = Some(now);
        pref.updated_at = Some(now);
        group_prefs.push(pref.clone());

        Ok(id)
    }

    async fn update_group_preference(&self, pref: &GroupPreference) -> NotifierResult<()> {
        let mut group_prefs = self.group_prefs.write().await;
        let pos = group_prefs
            .iter()
            .position(|p| p.id == pref.id)
            .ok_or_else(|| NotifierError::NotFound {
                entity: GroupPreference::TYPE_NAME,
                field: "id",
                value: format!("{:?}", pref.id),
            })?;

        let mut updated = pref.clone();
        updated.updated_at = Some(Utc::now());
        group_prefs[pos] = updated;
        Ok(())
    }

    async fn insert_delivery(&self, record: &mut DeliveryRecord) -> NotifierResult<Id> {
        let mut deliveries = self.deliveries.write().await;
        let id = self.next_id();
        record.id = Some(id);
        record.created_at = Some(Utc::now());
        deliveries.push(record.clone());
        Ok(id)
    }

    async fn list_deliveries_for_user(&self, user_id: Id) -> NotifierResult<Vec<DeliveryRecord>> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }
}
