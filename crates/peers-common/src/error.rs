//! Common error types for the peer relation components.
//!
//! The relation core itself is total: missing data is reported as absence,
//! never as an error. These variants cover the edges around it (configuration
//! and the event-source adapter).

use thiserror::Error;

/// Common errors across peer relation components
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeersError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hook name that does not describe a relation event
    #[error("Invalid hook name: {0}")]
    InvalidHook(String),

    /// Hook addressed to a relation this node does not track
    #[error("Hook for relation '{found}' delivered to relation '{expected}'")]
    RelationMismatch { expected: String, found: String },

    /// No conversation exists for the requested unit
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PeersError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::InvalidHook(_) => 400,
            Self::RelationMismatch { .. } => 400,
            Self::UnknownUnit(_) => 404,
            Self::InvalidInput(_) => 400,
        }
    }
}
