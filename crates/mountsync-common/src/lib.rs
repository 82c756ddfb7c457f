//! Mountsync Common Types
//!
//! Shared definitions used by every component of the mountsync system:
//!
//! - [`error`] - The fleet-wide error type and `Result` alias
//! - [`types`] - Core data types ([`Target`])
//!
//! Mountsync keeps the mount-table caches of a federated router fleet in
//! sync: when any router's table changes, every other router is told to
//! reload its cache through its admin endpoint.

pub mod error;
pub mod types;

pub use error::{RefreshError, Result};
pub use types::Target;
