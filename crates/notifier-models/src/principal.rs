//! User and group principals
//!
//! The host application owns its user and group records; this library sees
//! them as value objects carrying identity, contact fields, group
//! membership, and the permission codes the host has already resolved.

use std::collections::HashSet;

use notifier_core::traits::Id;
use serde::{Deserialize, Serialize};

/// Group principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Id,

    pub name: String,

    /// Permission codes granted through membership in this group
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl Group {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: HashSet::new(),
        }
    }

    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permissions.insert(code.into());
        self
    }
}

/// User principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,

    pub login: String,

    /// Email address for the email backend
    pub mail: String,

    /// Phone number for the SMS backend, when the host has one
    pub phone: Option<String>,

    /// Permission codes granted directly to the user
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Groups the user belongs to
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl User {
    pub fn new(id: Id, login: impl Into<String>, mail: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            mail: mail.into(),
            phone: None,
            permissions: HashSet::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_permission(mut self, code: impl Into<String>) -> Self {
        self.permissions.insert(code.into());
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn group_ids(&self) -> Vec<Id> {
        self.groups.iter().map(|g| g.id).collect()
    }

    /// Check one permission code against direct and group-derived grants
    pub fn has_perm(&self, code: &str) -> bool {
        self.permissions.contains(code) || self.groups.iter().any(|g| g.permissions.contains(code))
    }

    /// Check that the user holds every code in `required`
    ///
    /// An empty set always passes.
    pub fn has_perms(&self, required: &HashSet<String>) -> bool {
        required.iter().all(|code| self.has_perm(code))
    }
}
