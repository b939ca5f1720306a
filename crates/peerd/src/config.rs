//! Configuration management for peerd.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use peers_common::PeersError;
use peers_common::constants::{
    DEFAULT_LISTEN_ADDR, DEFAULT_RELATION_NAME, ENV_PREFIX, PRIVATE_ADDRESS_KEY, UNIT_SEPARATOR,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Peer relation settings
    #[serde(default)]
    pub relation: RelationConfig,
}

/// Peer relation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelationConfig {
    /// Relation identifier, used in hook and flag names
    #[serde(default = "default_relation_name")]
    pub name: String,

    /// Remote keys a peer must advertise before it is available
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,

    /// Remote key reported by the ip map endpoint when none is given
    #[serde(default = "default_address_key")]
    pub address_key: String,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            name: default_relation_name(),
            required_keys: default_required_keys(),
            address_key: default_address_key(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_relation_name() -> String { DEFAULT_RELATION_NAME.to_string() }
fn default_required_keys() -> Vec<String> { vec![PRIVATE_ADDRESS_KEY.to_string()] }
fn default_address_key() -> String { PRIVATE_ADDRESS_KEY.to_string() }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        Self::load_with_env(config_path, args, environment())
    }

    fn load_with_env(
        config_path: &str,
        args: &super::Args,
        env: config::Environment,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        let mut config: AppConfig = builder
            .add_source(env)
            .build()
            .context("Failed to load config")?
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref relation) = args.relation {
            config.relation.name = relation.clone();
        }

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), PeersError> {
        let name = &self.relation.name;
        if name.is_empty() || name.contains(UNIT_SEPARATOR) {
            return Err(PeersError::Config(format!("invalid relation name '{}'", name)));
        }
        if self.relation.required_keys.iter().any(|k| k.is_empty()) {
            return Err(PeersError::Config("required_keys must not contain empty keys".into()));
        }
        Ok(())
    }
}

/// `PEERD_*` variables; nested keys use `__` and lists are comma separated
/// (`PEERD_RELATION__REQUIRED_KEYS=private-address,ha-bindiface`)
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("relation.required_keys")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            relation: RelationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Args;

    fn args() -> Args {
        Args {
            config: String::new(),
            listen: None,
            relation: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    fn write_config(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("peerd-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load("does/not/exist.toml", &args()).unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.relation.name, "cluster");
        assert_eq!(config.relation.required_keys, vec!["private-address"]);
    }

    #[test]
    fn test_load_from_file() {
        let path = write_config(
            "file",
            r#"
listen_addr = "0.0.0.0:9999"

[relation]
name = "openstack-ha"
required_keys = ["private-address", "ha-bindiface"]
"#,
        );

        let config = AppConfig::load(&path, &args()).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:9999");
        assert_eq!(config.relation.name, "openstack-ha");
        assert_eq!(config.relation.required_keys.len(), 2);
        assert_eq!(config.relation.address_key, "private-address");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = args();
        args.listen = Some("127.0.0.1:1".to_string());
        args.relation = Some("hacluster".to_string());

        let config = AppConfig::load("does/not/exist.toml", &args).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:1");
        assert_eq!(config.relation.name, "hacluster");
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        environment().source(Some(source))
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_with_env(
            "does/not/exist.toml",
            &args(),
            env(&[
                ("PEERD_LISTEN_ADDR", "0.0.0.0:7000"),
                ("PEERD_RELATION__NAME", "openstack-ha"),
                ("PEERD_RELATION__REQUIRED_KEYS", "private-address,ha-bindiface"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:7000");
        assert_eq!(config.relation.name, "openstack-ha");
        assert_eq!(
            config.relation.required_keys,
            vec!["private-address", "ha-bindiface"]
        );
    }

    #[test]
    fn test_env_single_required_key() {
        let config = AppConfig::load_with_env(
            "does/not/exist.toml",
            &args(),
            env(&[("PEERD_RELATION__REQUIRED_KEYS", "ha-bindiface")]),
        )
        .unwrap();

        assert_eq!(config.relation.required_keys, vec!["ha-bindiface"]);
    }

    #[test]
    fn test_rejects_invalid_relation_name() {
        let mut args = args();
        args.relation = Some("unit/0".to_string());
        assert!(AppConfig::load("does/not/exist.toml", &args).is_err());
    }
}
