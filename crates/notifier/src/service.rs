//! Notifier service façade
//!
//! The entry point the host application holds. Owns the store handle and
//! the backend registry and wires the registration, resolution, and
//! dispatch components together.

use std::collections::BTreeMap;
use std::sync::Arc;

use notifier_core::{Id, NotifierError, NotifierResult};
use notifier_models::{
    Backend, Entity, Group, GroupPreference, Notification, PreferenceChange, User,
};
use tracing::{debug, info};

use crate::backends::{BackendRegistry, Context};
use crate::dispatcher::Dispatcher;
use crate::registry::{BackendSelector, PermissionSelector, Registry};
use crate::resolver::PreferenceResolver;
use crate::store::NotifierStore;

/// Notification preference management service
pub struct NotifierService {
    store: Arc<dyn NotifierStore>,
    backends: Arc<BackendRegistry>,
    registry: Registry,
    resolver: PreferenceResolver,
    dispatcher: Dispatcher,
}

impl NotifierService {
    pub fn new(store: Arc<dyn NotifierStore>, backends: Arc<BackendRegistry>) -> Self {
        Self {
            registry: Registry::new(store.clone()),
            resolver: PreferenceResolver::new(store.clone()),
            dispatcher: Dispatcher::new(store.clone(), backends.clone()),
            store,
            backends,
        }
    }

    /// One-time bootstrap: sync Backend rows from the registered
    /// delivery implementations
    ///
    /// Call once at application startup, after the store schema exists.
    pub async fn initialize(&self) -> NotifierResult<()> {
        let rows = self.registry.register_backends(&self.backends).await?;
        info!(count = rows.len(), "backend rows synced");
        Ok(())
    }

    /// Register or update a notification definition
    pub async fn register_notification(
        &self,
        name: &str,
        display_name: Option<&str>,
        permissions: Option<PermissionSelector>,
        backends: Option<BackendSelector>,
        public: bool,
    ) -> NotifierResult<Notification> {
        self.registry
            .register_notification(name, display_name, permissions, backends, public)
            .await
    }

    /// Send a notification by name
    ///
    /// An unregistered name is a silent no-op.
    pub async fn send(
        &self,
        name: &str,
        users: &[User],
        context: Option<&Context>,
    ) -> NotifierResult<()> {
        let Some(notification) = self.store.find_notification_by_name(name).await? else {
            debug!(notification = name, "send for unregistered notification, skipping");
            return Ok(());
        };
        self.dispatcher.dispatch(&notification, users, context).await
    }

    /// Update a user's per-backend preferences for a notification
    ///
    /// `prefs` maps backend names to the desired opt-in value. Returns the
    /// per-backend outcome, omitting entries that required no change.
    pub async fn update_preferences(
        &self,
        name: &str,
        user: &User,
        prefs: &BTreeMap<String, bool>,
    ) -> NotifierResult<BTreeMap<String, PreferenceChange>> {
        let notification = self.get_notification(name).await?;

        let mut changes = BTreeMap::new();
        for (backend_name, &notify) in prefs {
            let backend = self.get_backend(backend_name).await?;
            let change = self
                .resolver
                .set_user_preference(&notification, user, &backend, notify)
                .await?;
            if change != PreferenceChange::Unchanged {
                changes.insert(backend_name.clone(), change);
            }
        }
        Ok(changes)
    }

    /// Update a group's per-backend preferences for a notification
    ///
    /// The group-side twin of `update_preferences`; group rows are
    /// administrative and carry no permission gate.
    pub async fn update_group_preferences(
        &self,
        name: &str,
        group: &Group,
        prefs: &BTreeMap<String, bool>,
    ) -> NotifierResult<BTreeMap<String, PreferenceChange>> {
        let notification = self.get_notification(name).await?;
        let notification_id = notification
            .id
            .ok_or_else(|| NotifierError::Storage("notification row has no id".to_string()))?;

        let mut changes = BTreeMap::new();
        for (backend_name, &notify) in prefs {
            let backend = self.get_backend(backend_name).await?;
            let backend_id = backend
                .id
                .ok_or_else(|| NotifierError::Storage("backend row has no id".to_string()))?;

            let change = match self
                .store
                .find_group_preference(group.id, notification_id, backend_id)
                .await?
            {
                Some(existing) if existing.notify == notify => PreferenceChange::Unchanged,
                Some(mut existing) => {
                    existing.notify = notify;
                    self.store.update_group_preference(&existing).await?;
                    PreferenceChange::Updated
                }
                None => {
                    let mut pref =
                        GroupPreference::new(group.id, notification_id, backend_id, notify);
                    self.store.insert_group_preference(&mut pref).await?;
                    PreferenceChange::Created
                }
            };
            if change != PreferenceChange::Unchanged {
                changes.insert(backend_name.clone(), change);
            }
        }
        Ok(changes)
    }

    /// Remove every per-user preference row for the given users, reverting
    /// them to group/default behavior
    pub async fn clear_preferences(&self, users: &[User]) -> NotifierResult<usize> {
        let user_ids: Vec<Id> = users.iter().map(|u| u.id).collect();
        self.store.delete_user_preferences(&user_ids).await
    }

    /// Effective opt-in map for one notification, keyed by backend name
    pub async fn effective_preferences(
        &self,
        name: &str,
        user: &User,
    ) -> NotifierResult<BTreeMap<String, bool>> {
        let notification = self.get_notification(name).await?;
        self.resolver.effective_preferences(&notification, user).await
    }

    /// Effective opt-in maps for every public notification the user is
    /// permitted to see, keyed by notification name
    pub async fn effective_preferences_all(
        &self,
        user: &User,
    ) -> NotifierResult<BTreeMap<String, BTreeMap<String, bool>>> {
        let mut all = BTreeMap::new();
        for notification in self.store.list_public_notifications().await? {
            if self.resolver.check_permissions(&notification, user) {
                let map = self
                    .resolver
                    .effective_preferences(&notification, user)
                    .await?;
                all.insert(notification.name.clone(), map);
            }
        }
        Ok(all)
    }

    /// Public notifications the user may see and opt in/out of
    pub async fn visible_notifications(&self, user: &User) -> NotifierResult<Vec<Notification>> {
        self.resolver.visible_notifications(user).await
    }

    /// The injected store handle
    pub fn store(&self) -> &Arc<dyn NotifierStore> {
        &self.store
    }

    /// The preference resolver component
    pub fn resolver(&self) -> &PreferenceResolver {
        &self.resolver
    }

    async fn get_notification(&self, name: &str) -> NotifierResult<Notification> {
        self.store
            .find_notification_by_name(name)
            .await?
            .ok_or_else(|| NotifierError::NotFound {
                entity: Notification::TYPE_NAME,
                field: "name",
                value: name.to_string(),
            })
    }

    async fn get_backend(&self, name: &str) -> NotifierResult<Backend> {
        self.store
            .find_backend_by_name(name)
            .await?
            .ok_or_else(|| NotifierError::NotFound {
                entity: Backend::TYPE_NAME,
                field: "name",
                value: name.to_string(),
            })
    }
}
