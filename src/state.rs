//! Application state: the gateway, gameplay settings and the in-memory session registry.
//!
//! Sessions created over HTTP live in the registry until deleted or idle for longer than
//! `session_idle_ttl_secs`. WebSocket sessions are owned by their connection and never
//! registered; they end when the socket closes.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{GameConfig, GameSettings};
use crate::gateway::{build_gateway, Gateway};
use crate::runner::SessionHandle;

/// A registered session and the last time a request touched it.
#[derive(Clone)]
pub struct SessionEntry {
    pub handle: SessionHandle,
    pub touched: Instant,
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    pub gateway: Arc<dyn Gateway>,
    pub settings: GameSettings,
}

impl AppState {
    /// Build state from env: load config, pick the gateway (OpenAI or offline bank).
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = GameConfig::from_env();
        let gateway = build_gateway(&cfg);
        info!(
            target: "career_link",
            gateway = gateway.name(),
            mode = cfg.game.gateway_mode.as_str(),
            feedback_pause_ms = cfg.game.feedback_pause_ms,
            session_idle_ttl_secs = cfg.game.session_idle_ttl_secs,
            "Gateway ready"
        );
        Self::with_gateway(cfg.game, gateway)
    }

    pub fn with_gateway(settings: GameSettings, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            gateway,
            settings,
        }
    }

    /// Spawn a session runner that is not registered (owned by the caller).
    pub fn spawn_session(&self) -> SessionHandle {
        SessionHandle::spawn(self.gateway.clone(), self.settings.feedback_pause())
    }

    /// Spawn and register a session.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_session(&self) -> SessionHandle {
        let handle = self.spawn_session();
        let entry = SessionEntry { handle: handle.clone(), touched: Instant::now() };
        self.sessions.write().await.insert(handle.id(), entry);
        handle
    }

    /// Look up a session and mark it as recently used.
    pub async fn get_session(&self, id: &Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.handle.clone())
    }

    /// Unregister a session. Its runner stops once the last handle is dropped.
    #[instrument(level = "debug", skip(self))]
    pub async fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions untouched for at least `ttl`. Returns how many were removed.
    pub async fn sweep_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.touched) < ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(target: "session", removed, remaining = sessions.len(), "Idle sessions swept");
        }
        removed
    }

    /// Periodically sweep idle sessions for the life of the process.
    pub fn spawn_idle_sweeper(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let ttl = self.settings.session_idle_ttl();
        let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.sweep_idle(ttl).await;
            }
        })
    }
}
