//! Per-peer conversation records and the registry that owns them.

use peers_common::{Flag, Scope, Settings};
use std::collections::{BTreeSet, HashMap};

/// State of the relation with one peer unit
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Peer unit this conversation is scoped to
    scope: Scope,
    /// Values cached by the local node, never transmitted
    local: Settings,
    /// Latest values the peer advertised to us
    remote: Settings,
    /// Values we have published to the peer
    advertised: Settings,
    /// Active flags
    flags: BTreeSet<Flag>,
    /// Unix timestamp of the last mutation
    updated_at: i64,
}

impl Conversation {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            local: Settings::new(),
            remote: Settings::new(),
            advertised: Settings::new(),
            flags: BTreeSet::new(),
            updated_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    /// Local cache value for `key`, if any (may be empty)
    pub fn get_local(&self, key: &str) -> Option<&str> {
        self.local.get(key).map(String::as_str)
    }

    /// Merge `data` into the local cache
    pub fn set_local(&mut self, data: &Settings) {
        self.local
            .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.touch();
    }

    /// Peer-advertised value for `key`, if any (may be empty)
    pub fn get_remote(&self, key: &str) -> Option<&str> {
        self.remote.get(key).map(String::as_str)
    }

    /// Replace everything the peer advertised with a fresh snapshot
    pub fn replace_remote(&mut self, data: Settings) {
        self.remote = data;
        self.touch();
    }

    pub fn remote(&self) -> &Settings {
        &self.remote
    }

    /// Merge `data` into what we advertise to the peer
    pub fn advertise(&mut self, data: &Settings) {
        self.advertised
            .extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.touch();
    }

    pub fn advertised(&self) -> &Settings {
        &self.advertised
    }

    /// Set a flag. Returns true if it was not already set.
    pub fn set_state(&mut self, flag: Flag) -> bool {
        let changed = self.flags.insert(flag);
        if changed {
            self.touch();
        }
        changed
    }

    /// Clear a flag. Returns true if it was set.
    pub fn remove_state(&mut self, flag: Flag) -> bool {
        let changed = self.flags.remove(&flag);
        if changed {
            self.touch();
        }
        changed
    }

    pub fn has_state(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn flags(&self) -> impl Iterator<Item = Flag> + '_ {
        self.flags.iter().copied()
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp();
    }
}

/// All known conversations, keyed by scope and enumerated in registration order
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: Vec<Conversation>,
    index: HashMap<Scope, usize>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the conversation for `scope`
    pub fn get_or_create(&mut self, scope: &Scope) -> &mut Conversation {
        let idx = match self.index.get(scope) {
            Some(&idx) => idx,
            None => {
                let idx = self.conversations.len();
                self.conversations.push(Conversation::new(scope.clone()));
                self.index.insert(scope.clone(), idx);

                tracing::debug!(scope = %scope, "New conversation registered");
                idx
            }
        };

        &mut self.conversations[idx]
    }

    /// Get conversation (if exists)
    pub fn get(&self, scope: &Scope) -> Option<&Conversation> {
        self.index.get(scope).map(|&idx| &self.conversations[idx])
    }

    /// Look a conversation up by its flat node identifier (`"unit-a-0"`)
    pub fn find_by_node_id(&self, node_id: &str) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conv| conv.scope().node_id() == node_id)
    }

    pub fn contains(&self, scope: &Scope) -> bool {
        self.index.contains_key(scope)
    }

    /// Iterate all conversations in registration order
    pub fn all(&self) -> impl Iterator<Item = &Conversation> + '_ {
        self.conversations.iter()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Conversation> + '_ {
        self.conversations.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
