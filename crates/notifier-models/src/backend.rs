//! Backend delivery-method entity

use chrono::{DateTime, Utc};
use notifier_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered delivery method (email, SMS, ...)
///
/// Rows are created and refreshed at bootstrap from the backend registry;
/// the `name` keys into that registry to reach the delivery implementation.
/// Identity is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    pub id: Option<Id>,

    /// Unique identifier
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 200))]
    pub display_name: String,

    #[validate(length(max = 500))]
    pub description: String,

    /// This can be set to false to stop all deliveries using this
    /// method, regardless of permissions and preferences
    pub enabled: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Backend {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            display_name: display_name.into(),
            description: String::new(),
            enabled: true,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Identifiable for Backend {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Backend {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Backend {
    const TYPE_NAME: &'static str = "Backend";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new() {
        let backend = Backend::new("email", "Email").with_description("Send via email");

        assert_eq!(backend.name, "email");
        assert!(backend.enabled);
        assert!(backend.is_new_record());
    }

    #[test]
    fn test_backend_validation() {
        let backend = Backend::new("", "Email");
        assert!(backend.validate().is_err());
    }
}
