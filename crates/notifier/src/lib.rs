//! # notifier
//!
//! Notification preference management for host applications.
//!
//! ## Features
//!
//! - Named notification registration with required permissions and
//!   allowed delivery backends
//! - Per-user and per-group opt-in/opt-out, resolved user-first
//! - Sequential dispatch with one audit record per delivery attempt
//! - Pluggable storage behind `NotifierStore` (in-memory store included)
//! - Email and SMS delivery behind a capability trait

pub mod backends;
pub mod dispatcher;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod store;

pub use backends::{BackendDescriptor, BackendRegistry, Context, DeliveryBackend, TransportError};
pub use dispatcher::Dispatcher;
pub use registry::{BackendSelector, PermissionSelector, Registry};
pub use resolver::PreferenceResolver;
pub use service::NotifierService;
pub use store::{MemoryStore, NotifierStore};
