//! Notification entity

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use notifier_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A named notification type
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Notification {
    pub id: Option<Id>,

    /// Unique name, the registration and send key
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub display_name: String,

    /// Whether the notification is listed in user-facing preference
    /// screens. Private notifications stay fully usable from code.
    pub public: bool,

    /// Permission codes a user must all hold to see this notification
    /// or change their own preferences for it
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Backends allowed for this notification
    #[serde(default)]
    pub backend_ids: HashSet<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            display_name: display_name.into(),
            public: true,
            permissions: HashSet::new(),
            backend_ids: HashSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permissions.insert(code.into());
        self
    }

    pub fn with_backend(mut self, backend_id: Id) -> Self {
        self.backend_ids.insert(backend_id);
        self
    }

    pub fn requires_permissions(&self) -> bool {
        !self.permissions.is_empty()
    }

    pub fn has_backends(&self) -> bool {
        !self.backend_ids.is_empty()
    }
}

impl Identifiable for Notification {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Notification {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Notification {
    const TYPE_NAME: &'static str = "Notification";
}
