//! Core types shared across peer relation components.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{HOOK_SEPARATOR, NODE_ID_SEPARATOR, UNIT_SEPARATOR};
use crate::error::PeersError;

/// Key/value data exchanged with a peer.
///
/// Ordered so that serialized snapshots are stable.
pub type Settings = BTreeMap<String, String>;

/// Stable identifier for one peer unit's conversation (e.g. `"unit-a/0"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn new(unit: impl Into<String>) -> Self {
        Self(unit.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Flat node identifier derived from the unit name (`"unit-a/0"` -> `"unit-a-0"`)
    pub fn node_id(&self) -> String {
        self.0.replace(UNIT_SEPARATOR, &NODE_ID_SEPARATOR.to_string())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Named boolean state carried by each conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// The peer relation currently exists
    Connected,
    /// The peer has supplied all required data
    Available,
}

impl Flag {
    pub const ALL: [Flag; 2] = [Flag::Connected, Flag::Available];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Available => "available",
        }
    }

    /// Flag name as seen by the application (`"cluster.available"`)
    pub fn qualified(&self, relation: &str) -> String {
        format!("{}.{}", relation, self.as_str())
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topology event delivered by the hosting runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Joined,
    Changed,
    Departed,
    Broken,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Changed => "changed",
            Self::Departed => "departed",
            Self::Broken => "broken",
        }
    }

    /// Parse a full hook name such as `"cluster-relation-changed"`.
    ///
    /// The relation part must match `relation`; hooks for other relations are
    /// rejected rather than silently applied.
    pub fn from_hook_name(relation: &str, hook: &str) -> Result<Self, PeersError> {
        let (found, event) = hook
            .rsplit_once(HOOK_SEPARATOR)
            .ok_or_else(|| PeersError::InvalidHook(hook.to_string()))?;

        let kind = event
            .parse::<HookKind>()
            .map_err(|_| PeersError::InvalidHook(hook.to_string()))?;

        if found != relation {
            return Err(PeersError::RelationMismatch {
                expected: relation.to_string(),
                found: found.to_string(),
            });
        }

        Ok(kind)
    }

    /// Hook name for this event on `relation`
    pub fn hook_name(&self, relation: &str) -> String {
        format!("{}{}{}", relation, HOOK_SEPARATOR, self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = PeersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined" => Ok(Self::Joined),
            "changed" => Ok(Self::Changed),
            "departed" => Ok(Self::Departed),
            "broken" => Ok(Self::Broken),
            other => Err(PeersError::InvalidHook(other.to_string())),
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
