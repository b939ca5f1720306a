//! Peer coordinator: conversation state machine and relation-wide operations.
//!
//! Flag transitions per topology event:
//!
//! | Event             | Action                                                   |
//! |-------------------|----------------------------------------------------------|
//! | joined            | set `connected`                                          |
//! | changed           | set `connected`; set `available` if data is complete     |
//! | departed / broken | clear `connected`; clear `available` if data is incomplete |
//!
//! Departing only drops `available` when the cached data is already
//! incomplete, so a stale `changed` racing a `departed` keeps the peer
//! available. Cached data is never deleted on depart.

use peers_common::constants::ADDRESS_KEY_SUFFIX;
use peers_common::{Flag, HookKind, Scope, Settings};

use super::conversation::{Conversation, ConversationRegistry};
use super::transport::RelationTransport;

/// Relation-wide coordinator over every peer conversation
pub struct PeerCoordinator<T> {
    /// Relation identifier used to name flags (`"<relation>.available"`)
    relation: String,
    /// Remote keys a peer must advertise (non-empty) to be available
    required_keys: Vec<String>,
    /// Known conversations
    registry: ConversationRegistry,
    /// Outbound delivery of advertised settings
    transport: T,
}

impl<T: RelationTransport> PeerCoordinator<T> {
    /// Create a new coordinator
    pub fn new(relation: impl Into<String>, required_keys: Vec<String>, transport: T) -> Self {
        Self {
            relation: relation.into(),
            required_keys,
            registry: ConversationRegistry::new(),
            transport,
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch a topology event to its handler
    pub fn handle(&mut self, kind: HookKind, scope: &Scope) {
        match kind {
            HookKind::Joined => self.joined(scope),
            HookKind::Changed => self.changed(scope),
            HookKind::Departed => self.departed(scope),
            HookKind::Broken => self.broken(scope),
        }
    }

    pub fn joined(&mut self, scope: &Scope) {
        let conv = conversation_for(&mut self.registry, scope, HookKind::Joined);
        if conv.set_state(Flag::Connected) {
            tracing::info!(scope = %scope, relation = %self.relation, "Peer connected");
        }
    }

    pub fn changed(&mut self, scope: &Scope) {
        let conv = conversation_for(&mut self.registry, scope, HookKind::Changed);
        if conv.set_state(Flag::Connected) {
            tracing::info!(scope = %scope, relation = %self.relation, "Peer connected");
        }

        if is_complete(&self.required_keys, conv) {
            if conv.set_state(Flag::Available) {
                tracing::info!(scope = %scope, relation = %self.relation, "Peer available");
            }
        } else {
            tracing::debug!(
                scope = %scope,
                required = ?self.required_keys,
                "Peer data incomplete"
            );
        }
    }

    pub fn departed(&mut self, scope: &Scope) {
        self.depart(scope, HookKind::Departed);
    }

    pub fn broken(&mut self, scope: &Scope) {
        self.depart(scope, HookKind::Broken);
    }

    fn depart(&mut self, scope: &Scope, kind: HookKind) {
        let conv = conversation_for(&mut self.registry, scope, kind);
        if conv.remove_state(Flag::Connected) {
            tracing::info!(scope = %scope, event = %kind, "Peer disconnected");
        }

        if !is_complete(&self.required_keys, conv) && conv.remove_state(Flag::Available) {
            tracing::info!(scope = %scope, event = %kind, "Peer no longer available");
        }
    }

    /// Store a fresh snapshot of what the peer advertises, replacing the old one
    pub fn receive(&mut self, scope: &Scope, settings: Settings) {
        tracing::trace!(scope = %scope, keys = settings.len(), "Received peer settings");
        self.registry.get_or_create(scope).replace_remote(settings);
    }

    /// True iff every required key has a non-empty remote value
    pub fn data_complete(&self, conv: &Conversation) -> bool {
        is_complete(&self.required_keys, conv)
    }

    /// `(node_id, address)` for every conversation, `None` where the peer
    /// has not advertised `address_key`
    pub fn ip_map(&self, address_key: &str) -> Vec<(String, Option<String>)> {
        self.registry
            .all()
            .map(|conv| {
                let address = conv
                    .get_remote(address_key)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                (conv.scope().node_id(), address)
            })
            .collect()
    }

    /// Advertise `{address_type}-address` to every peer
    pub fn set_address(&mut self, address_type: &str, address: &str) {
        let mut settings = Settings::new();
        settings.insert(
            format!("{}{}", address_type, ADDRESS_KEY_SUFFIX),
            address.to_string(),
        );

        for conv in self.registry.all_mut() {
            conv.advertise(&settings);
            self.transport.publish(conv.scope(), &settings);
        }

        tracing::debug!(address_type = %address_type, address = %address, "Address advertised");
    }

    /// Advertise `settings` to every peer, optionally mirroring them into
    /// each conversation's local cache
    pub fn send_all(&mut self, settings: &Settings, store_local: bool) {
        for conv in self.registry.all_mut() {
            conv.advertise(settings);
            self.transport.publish(conv.scope(), settings);
            if store_local {
                conv.set_local(settings);
            }
        }

        tracing::debug!(
            keys = settings.len(),
            peers = self.registry.len(),
            store_local,
            "Settings broadcast"
        );
    }

    /// Non-empty local cache values for `key`, one per conversation that has it
    pub fn retrieve_local(&self, key: &str) -> Vec<String> {
        self.registry
            .all()
            .filter_map(|conv| conv.get_local(key))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Non-empty peer-advertised values for `key`, one per conversation that has it
    pub fn retrieve_remote(&self, key: &str) -> Vec<String> {
        self.registry
            .all()
            .filter_map(|conv| conv.get_remote(key))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True if at least one conversation holds `flag`
    pub fn is_set(&self, flag: Flag) -> bool {
        self.registry.all().any(|conv| conv.has_state(flag))
    }

    /// Relation-level flag names currently set (`["cluster.connected", ...]`)
    pub fn active_states(&self) -> Vec<String> {
        Flag::ALL
            .iter()
            .filter(|flag| self.is_set(**flag))
            .map(|flag| flag.qualified(&self.relation))
            .collect()
    }

    /// Flag names held by a single conversation
    pub fn conversation_states(&self, scope: &Scope) -> Option<Vec<String>> {
        self.registry.get(scope).map(|conv| {
            conv.flags()
                .map(|flag| flag.qualified(&self.relation))
                .collect()
        })
    }
}

/// Conversation for an event, created on demand.
///
/// Anything but `joined` should find an existing conversation; out-of-order
/// delivery is tolerated.
fn conversation_for<'a>(
    registry: &'a mut ConversationRegistry,
    scope: &Scope,
    kind: HookKind,
) -> &'a mut Conversation {
    if kind != HookKind::Joined && !registry.contains(scope) {
        tracing::debug!(scope = %scope, event = %kind, "Event for unseen peer, creating conversation");
    }
    registry.get_or_create(scope)
}

fn is_complete(required_keys: &[String], conv: &Conversation) -> bool {
    required_keys
        .iter()
        .all(|key| conv.get_remote(key).is_some_and(|v| !v.is_empty()))
}
