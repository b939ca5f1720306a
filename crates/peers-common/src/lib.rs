//! # Peers Common
//!
//! Shared types and utilities for the HA peer relation.
//!
//! ## Modules
//! - `types` - Relation vocabulary (Scope, Flag, HookKind, Settings)
//! - `error` - Common error types
//! - `constants` - Shared keys and defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::PeersError;
pub use types::*;
