//! Debounced session writer.
//!
//! Every change re-arms a single timer; only the state present when the
//! timer finally fires is written. Intermediate states are dropped.
//! Writes go through a single gate, so a slow write is never overtaken by a
//! newer one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cellcount_core::coercion::sanitize_session;
use cellcount_core::identity::Identity;
use cellcount_core::session::{SessionRepository, SessionState};
use tokio_util::sync::CancellationToken;

/// Best-effort synchronisation of the session document.
///
/// Storage failures are logged and swallowed here; the next change simply
/// tries again.
pub struct SessionSync {
    repository: Arc<dyn SessionRepository>,
    owner: Identity,
    delay: Duration,
    /// Latest state waiting to be written.
    pending: Arc<Mutex<Option<SessionState>>>,
    /// Cancels the armed timer, if any.
    timer: Mutex<Option<CancellationToken>>,
    /// Held for the whole take-and-write of a pending state.
    write_gate: Arc<tokio::sync::Mutex<()>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionSync {
    pub fn new(repository: Arc<dyn SessionRepository>, owner: Identity, delay: Duration) -> Self {
        Self {
            repository,
            owner,
            delay,
            pending: Arc::new(Mutex::new(None)),
            timer: Mutex::new(None),
            write_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Loads the stored session, sanitized.
    ///
    /// `None` when nothing is stored or the store failed.
    pub async fn load(&self) -> Option<SessionState> {
        match self.repository.load_session(&self.owner).await {
            Ok(raw) => sanitize_session(raw.as_ref()),
            Err(e) => {
                tracing::error!("[SessionSync] Failed to load session for {}: {}", self.owner, e);
                None
            }
        }
    }

    /// Queues `state` and (re)arms the timer. Must be called inside a tokio runtime.
    pub fn schedule(&self, state: &SessionState) {
        *lock(&self.pending) = Some(state.clone());

        let token = CancellationToken::new();
        if let Some(previous) = lock(&self.timer).replace(token.clone()) {
            previous.cancel();
        }

        let repository = self.repository.clone();
        let owner = self.owner.clone();
        let pending = self.pending.clone();
        let write_gate = self.write_gate.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    write_pending(repository.as_ref(), &owner, &pending, &write_gate).await;
                }
            }
        });
    }

    /// True while a change is waiting for the timer.
    pub fn has_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    /// Writes the pending state now instead of waiting for the timer.
    pub async fn flush(&self) {
        self.disarm();
        write_pending(
            self.repository.as_ref(),
            &self.owner,
            &self.pending,
            &self.write_gate,
        )
        .await;
    }

    /// Disarms the timer and drops the pending state without writing it.
    pub fn cancel(&self) {
        self.disarm();
        lock(&self.pending).take();
    }

    fn disarm(&self) {
        if let Some(token) = lock(&self.timer).take() {
            token.cancel();
        }
    }
}

impl Drop for SessionSync {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Takes the pending state under the gate, so writes land in the order the
/// states were taken.
async fn write_pending(
    repository: &dyn SessionRepository,
    owner: &Identity,
    pending: &Mutex<Option<SessionState>>,
    write_gate: &tokio::sync::Mutex<()>,
) {
    let _gate = write_gate.lock().await;
    let state = lock(pending).take();
    if let Some(state) = state {
        write(repository, owner, &state).await;
    }
}

async fn write(repository: &dyn SessionRepository, owner: &Identity, state: &SessionState) -> bool {
    let data = match serde_json::to_value(state) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("[SessionSync] Failed to serialize session: {}", e);
            return false;
        }
    };

    match repository.save_session(owner, data).await {
        Ok(()) => {
            tracing::debug!("[SessionSync] Session saved for {}", owner);
            true
        }
        Err(e) => {
            tracing::warn!("[SessionSync] Failed to save session for {}: {}", owner, e);
            false
        }
    }
}
