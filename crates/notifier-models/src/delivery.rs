//! Delivery audit records

use chrono::{DateTime, Utc};
use notifier_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

/// Record of one delivery attempt
///
/// Written once per (user, notification, backend) attempt; never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: Option<Id>,

    pub user_id: Id,
    pub notification_id: Id,
    pub backend_id: Id,

    pub success: bool,

    pub created_at: Option<DateTime<Utc>>,
}

impl DeliveryRecord {
    fn new(user_id: Id, notification_id: Id, backend_id: Id, success: bool) -> Self {
        Self {
            id: None,
            user_id,
            notification_id,
            backend_id,
            success,
            created_at: None,
        }
    }

    pub fn success(user_id: Id, notification_id: Id, backend_id: Id) -> Self {
        Self::new(user_id, notification_id, backend_id, true)
    }

    pub fn failure(user_id: Id, notification_id: Id, backend_id: Id) -> Self {
        Self::new(user_id, notification_id, backend_id, false)
    }
}

impl Identifiable for DeliveryRecord {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for DeliveryRecord {
    const TYPE_NAME: &'static str = "DeliveryRecord";
}
