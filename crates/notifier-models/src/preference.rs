//! Per-group and per-user delivery preferences

use chrono::{DateTime, Utc};
use notifier_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

/// Per-group preference row
///
/// One row per (group, notification, backend). Absence of a granting row
/// means the group default is off.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreference {
    pub id: Option<Id>,

    pub group_id: Id,
    pub notification_id: Id,
    pub backend_id: Id,

    pub notify: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GroupPreference {
    pub fn new(group_id: Id, notification_id: Id, backend_id: Id, notify: bool) -> Self {
        Self {
            id: None,
            group_id,
            notification_id,
            backend_id,
            notify,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for GroupPreference {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for GroupPreference {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for GroupPreference {
    const TYPE_NAME: &'static str = "GroupPreference";
}

/// Per-user preference row
///
/// One row per (user, notification, backend). Supersedes any group setting
/// for the same notification and backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub id: Option<Id>,

    pub user_id: Id,
    pub notification_id: Id,
    pub backend_id: Id,

    pub notify: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreference {
    pub fn new(user_id: Id, notification_id: Id, backend_id: Id, notify: bool) -> Self {
        Self {
            id: None,
            user_id,
            notification_id,
            backend_id,
            notify,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for UserPreference {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for UserPreference {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for UserPreference {
    const TYPE_NAME: &'static str = "UserPreference";
}

/// Outcome of a preference upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceChange {
    Created,
    Updated,
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_rows() {
        let group_pref = GroupPreference::new(1, 2, 3, true);
        assert!(group_pref.notify);
        assert!(group_pref.is_new_record());

        let user_pref = UserPreference::new(1, 2, 3, false);
        assert!(!user_pref.notify);
        assert_eq!(user_pref.user_id, 1);
    }
}
