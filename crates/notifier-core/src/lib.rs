//! # notifier-core
//!
//! Core types, traits, and utilities for notifier-rs.
//!
//! This crate provides the foundational building blocks used across the
//! other crates:
//! - The `NotifierError` taxonomy and `NotifierResult` alias
//! - Core entity traits (`Entity`, `Identifiable`, `Timestamped`)
//! - Configuration types and environment loading

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::*;
pub use result::*;
pub use traits::*;
