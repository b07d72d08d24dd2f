//! Preference resolution
//!
//! The cascade: a user's own preference row is authoritative; otherwise any
//! group row granting delivery wins; otherwise the backend is excluded.
//! Only backends that are attached to the notification and enabled are
//! considered at all.

use std::collections::BTreeMap;
use std::sync::Arc;

use notifier_core::{Id, NotifierError, NotifierResult};
use notifier_models::{Backend, Notification, PreferenceChange, User, UserPreference};

use crate::store::NotifierStore;

/// Resolves effective delivery backends per user and owns preference writes
pub struct PreferenceResolver {
    store: Arc<dyn NotifierStore>,
}

impl PreferenceResolver {
    pub fn new(store: Arc<dyn NotifierStore>) -> Self {
        Self { store }
    }

    /// Check that the user holds every permission the notification requires
    ///
    /// An empty requirement set always passes.
    pub fn check_permissions(&self, notification: &Notification, user: &User) -> bool {
        user.has_perms(&notification.permissions)
    }

    /// Backends that resolve to deliver for this user
    pub async fn resolve_backends(
        &self,
        notification: &Notification,
        user: &User,
    ) -> NotifierResult<Vec<Backend>> {
        let mut selected = Vec::new();
        for backend in self.candidate_backends(notification).await? {
            let backend_id = persisted_id(&backend)?;
            if self.backend_selected(notification, user, backend_id).await? {
                selected.push(backend);
            }
        }
        Ok(selected)
    }

    /// Every enabled attached backend mapped to its cascade outcome, keyed
    /// by backend name; used to render opt-in/opt-out controls
    pub async fn effective_preferences(
        &self,
        notification: &Notification,
        user: &User,
    ) -> NotifierResult<BTreeMap<String, bool>> {
        let mut map = BTreeMap::new();
        for backend in self.candidate_backends(notification).await? {
            let backend_id = persisted_id(&backend)?;
            let selected = self.backend_selected(notification, user, backend_id).await?;
            map.insert(backend.name, selected);
        }
        Ok(map)
    }

    /// Upsert the user's preference row for one backend
    ///
    /// Fails with `PermissionDenied` before any write when the user lacks a
    /// required permission. Writing the already-stored value is a no-op
    /// reported as `Unchanged`.
    pub async fn set_user_preference(
        &self,
        notification: &Notification,
        user: &User,
        backend: &Backend,
        notify: bool,
    ) -> NotifierResult<PreferenceChange> {
        if !self.check_permissions(notification, user) {
            return Err(NotifierError::PermissionDenied {
                message: format!(
                    "user {} lacks permissions required by notification {}",
                    user.login, notification.name
                ),
            });
        }

        let notification_id = notification_id(notification)?;
        let backend_id = persisted_id(backend)?;

        match self
            .store
            .find_user_preference(user.id, notification_id, backend_id)
            .await?
        {
            Some(existing) if existing.notify == notify => Ok(PreferenceChange::Unchanged),
            Some(mut existing) => {
                existing.notify = notify;
                self.store.update_user_preference(&existing).await?;
                Ok(PreferenceChange::Updated)
            }
            None => {
                let mut pref = UserPreference::new(user.id, notification_id, backend_id, notify);
                self.store.insert_user_preference(&mut pref).await?;
                Ok(PreferenceChange::Created)
            }
        }
    }

    /// Public notifications with at least one attached backend that the
    /// user is permitted to see; recomputed on every call
    pub async fn visible_notifications(&self, user: &User) -> NotifierResult<Vec<Notification>> {
        let mut visible = Vec::new();
        for notification in self.store.list_public_notifications().await? {
            if notification.has_backends() && self.check_permissions(&notification, user) {
                visible.push(notification);
            }
        }
        Ok(visible)
    }

    /// Enabled backends attached to the notification
    async fn candidate_backends(&self, notification: &Notification) -> NotifierResult<Vec<Backend>> {
        let enabled = self.store.list_enabled_backends().await?;
        Ok(enabled
            .into_iter()
            .filter(|b| matches!(b.id, Some(id) if notification.backend_ids.contains(&id)))
            .collect())
    }

    /// Cascade decision for one candidate backend
    async fn backend_selected(
        &self,
        notification: &Notification,
        user: &User,
        backend_id: Id,
    ) -> NotifierResult<bool> {
        let notification_id = notification_id(notification)?;

        if let Some(pref) = self
            .store
            .find_user_preference(user.id, notification_id, backend_id)
            .await?
        {
            return Ok(pref.notify);
        }

        let group_ids = user.group_ids();
        if group_ids.is_empty() {
            return Ok(false);
        }

        let group_prefs = self
            .store
            .find_group_preferences(&group_ids, notification_id, backend_id)
            .await?;
        Ok(group_prefs.iter().any(|p| p.notify))
    }
}

fn notification_id(notification: &Notification) -> NotifierResult<Id> {
    notification
        .id
        .ok_or_else(|| NotifierError::Storage("notification row has no id".to_string()))
}

fn persisted_id(backend: &Backend) -> NotifierResult<Id> {
    backend
        .id
        .ok_or_else(|| NotifierError::Storage("backend row has no id".to_string()))
}
