//! Outbound side of the relation.
//!
//! Moving settings to the peer is the host runtime's job. The coordinator
//! hands every write to a [`RelationTransport`] synchronously and does not
//! wait for delivery.

use peers_common::{Scope, Settings};

/// Delivers advertised settings to the peer behind a conversation
pub trait RelationTransport {
    /// Publish `settings` to the peer unit identified by `scope`
    fn publish(&mut self, scope: &Scope, settings: &Settings);
}

/// Transport that only records publishes in the log.
///
/// Peers poll what we advertise through the HTTP adapter, so nothing has to
/// be pushed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTransport;

impl RelationTransport for TracingTransport {
    fn publish(&mut self, scope: &Scope, settings: &Settings) {
        tracing::debug!(
            scope = %scope,
            keys = ?settings.keys().collect::<Vec<_>>(),
            "Published settings to peer"
        );
    }
}
