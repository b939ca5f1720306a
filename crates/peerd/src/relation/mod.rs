//! Peer relation core.
//!
//! Implements:
//! - Conversation registry (one record per peer unit)
//! - Connected/available state machine driven by topology events
//! - Settings broadcast and relation-wide queries

mod conversation;
mod coordinator;
mod transport;

pub use coordinator::PeerCoordinator;
pub use transport::TracingTransport;
