//! # notifier-models
//!
//! Domain entities for notifier-rs.
//!
//! This crate contains the rows the backing store owns (backends,
//! notifications, preferences, delivery records) plus the user and group
//! value objects the host application hands in. Stored entities implement
//! the core traits from `notifier-core` (Entity, Identifiable, Timestamped).

pub use notifier_core::traits::{Entity, Id, Identifiable, Timestamped};

pub mod backend;
pub mod delivery;
pub mod notification;
pub mod preference;
pub mod principal;

// Re-exports for convenience
pub use backend::Backend;
pub use delivery::DeliveryRecord;
pub use notification::Notification;
pub use preference::{GroupPreference, PreferenceChange, UserPreference};
pub use principal::{Group, User};
