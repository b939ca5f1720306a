//! Shared constants for the peer relation components.

/// Default peerd HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/peerd.toml";

/// Prefix for environment variable overrides (PEERD_LISTEN_ADDR, ...)
pub const ENV_PREFIX: &str = "PEERD";

/// Relation name used when none is configured
pub const DEFAULT_RELATION_NAME: &str = "cluster";

/// Remote key every peer must advertise before it counts as available
pub const PRIVATE_ADDRESS_KEY: &str = "private-address";

/// Suffix appended to an address type ("internal" -> "internal-address")
pub const ADDRESS_KEY_SUFFIX: &str = "-address";

/// Separator between relation name and event in hook names
/// ("cluster-relation-joined")
pub const HOOK_SEPARATOR: &str = "-relation-";

/// Separator used in hierarchical unit names ("unit-a/0")
pub const UNIT_SEPARATOR: char = '/';

/// Replacement for [`UNIT_SEPARATOR`] when deriving flat node identifiers
pub const NODE_ID_SEPARATOR: char = '-';
