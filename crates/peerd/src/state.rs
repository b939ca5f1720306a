//! Application state and shared resources.

use peers_common::{Flag, HookKind, PeersError, Scope, Settings};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::relation::{PeerCoordinator, TracingTransport};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Relation coordinator. Hooks and API calls are serialized through the lock.
    pub coordinator: Arc<RwLock<PeerCoordinator<TracingTransport>>>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state with an empty relation
    pub fn new(config: AppConfig) -> Self {
        let coordinator = PeerCoordinator::new(
            config.relation.name.clone(),
            config.relation.required_keys.clone(),
            TracingTransport,
        );

        Self {
            config,
            coordinator: Arc::new(RwLock::new(coordinator)),
            started_at: Instant::now(),
        }
    }

    /// Apply a hook delivered by the runtime.
    ///
    /// A settings snapshot, when present, replaces what the peer advertised
    /// before the event is evaluated.
    pub async fn dispatch_hook(
        &self,
        hook: &str,
        unit: Scope,
        settings: Option<Settings>,
    ) -> Result<HookKind, PeersError> {
        let kind = HookKind::from_hook_name(&self.config.relation.name, hook)?;

        let mut coordinator = self.coordinator.write().await;
        if let Some(settings) = settings {
            coordinator.receive(&unit, settings);
        }
        coordinator.handle(kind, &unit);

        tracing::debug!(hook = %hook, unit = %unit, "Hook dispatched");

        Ok(kind)
    }

    /// True when at least one peer has supplied all required data
    pub async fn is_available(&self) -> bool {
        self.coordinator.read().await.is_set(Flag::Available)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
