//! Startup: resolve the identity, then load the stored session once.

use std::sync::Arc;
use std::time::Duration;

use cellcount_core::identity::IdentityProvider;
use cellcount_core::session::{SessionRepository, SessionState};

use super::sync::SessionSync;

/// Result of trying to start a session.
pub enum SessionStart {
    /// No identity yet: nothing may be loaded or written.
    IdentityPending,
    /// Identity known but nothing stored (or the store failed): defaults.
    Fresh(SessionSync, SessionState),
    /// A stored session was loaded and sanitized.
    Restored(SessionSync, SessionState),
}

impl SessionStart {
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored(..))
    }
}

pub async fn start_session(
    identity: &dyn IdentityProvider,
    repository: Arc<dyn SessionRepository>,
    debounce: Duration,
) -> SessionStart {
    let Some(owner) = identity.current_identity() else {
        tracing::info!("[Bootstrap] Identity not available yet, session sync disabled");
        return SessionStart::IdentityPending;
    };

    let sync = SessionSync::new(repository, owner, debounce);
    match sync.load().await {
        Some(state) => {
            tracing::info!(
                "[Bootstrap] Restored session for {} (sample '{}')",
                sync.owner(),
                state.sample_id
            );
            SessionStart::Restored(sync, state)
        }
        None => {
            tracing::info!("[Bootstrap] No stored session for {}, using defaults", sync.owner());
            SessionStart::Fresh(sync, SessionState::default())
        }
    }
}
