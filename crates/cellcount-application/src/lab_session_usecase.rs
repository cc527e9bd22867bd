//! Lab session use case.
//!
//! This module provides the `LabSessionUseCase`, which owns the in-progress
//! session and sequences technician actions: every edit mutates local state
//! synchronously and then re-arms the debounced writer, while saving and
//! deleting records go to the history store.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use cellcount_core::coercion::parse_volume_input;
use cellcount_core::config::LabSettings;
use cellcount_core::counting::{CountKind, CountTarget, CountingMode};
use cellcount_core::error::{LabError, Result};
use cellcount_core::history::{HistoryRecord, HistoryRepository, try_build_record};
use cellcount_core::identity::{Identity, IdentityProvider};
use cellcount_core::results::{ConcentrationResults, Totals};
use cellcount_core::session::{Confirmation, SessionRepository, SessionState};
use cellcount_core::volume::{VolumeField, VolumePreset};
use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::history_feed::{HistorySubscription, subscribe_to_history};
use crate::notice::{Notice, NoticeBoard, NoticeKind};
use crate::session::{SessionStart, SessionSync, start_session};

/// Use case for counting one sample at a time.
///
/// # Responsibilities
///
/// - Applying edits to the session and scheduling its debounced save
/// - Gating destructive actions behind their confirmation rules
/// - Turning a complete session into a history record
/// - Keeping a local copy of the history in step with the store
/// - Surfacing validation and storage failures as a transient notice
///
/// Single writer: all mutation goes through `&mut self`.
pub struct LabSessionUseCase {
    state: SessionState,
    restored: bool,
    sync: SessionSync,
    history_repository: Arc<dyn HistoryRepository>,
    /// Latest history delivered by the subscription, newest first.
    history: Arc<RwLock<Vec<HistoryRecord>>>,
    subscription: Option<HistorySubscription>,
    notices: NoticeBoard,
}

impl LabSessionUseCase {
    /// Resolves the identity and loads the stored session.
    ///
    /// # Errors
    ///
    /// `LabError::IdentityUnavailable` when no identity is known yet; storage
    /// failures during the load fall back to a fresh session instead.
    pub async fn start(
        identity: &dyn IdentityProvider,
        session_repository: Arc<dyn SessionRepository>,
        history_repository: Arc<dyn HistoryRepository>,
        settings: &LabSettings,
    ) -> Result<Self> {
        let debounce = Duration::from_millis(settings.debounce_ms);
        let (sync, state, restored) =
            match start_session(identity, session_repository, debounce).await {
                SessionStart::IdentityPending => return Err(LabError::IdentityUnavailable),
                SessionStart::Fresh(sync, state) => (sync, state, false),
                SessionStart::Restored(sync, state) => (sync, state, true),
            };

        Ok(Self {
            state,
            restored,
            sync,
            history_repository,
            history: Arc::new(RwLock::new(Vec::new())),
            subscription: None,
            notices: NoticeBoard::new(Duration::from_millis(settings.notice_clear_ms)),
        })
    }

    // ============================================================================
    // Derived values
    // ============================================================================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn owner(&self) -> &Identity {
        self.sync.owner()
    }

    /// Whether the session came from storage rather than defaults.
    pub fn was_restored(&self) -> bool {
        self.restored
    }

    pub fn dilution_factor(&self) -> f64 {
        self.state.dilution_factor()
    }

    pub fn totals(&self) -> Totals {
        self.state.totals()
    }

    pub fn results(&self) -> ConcentrationResults {
        self.state.results()
    }

    pub fn uncounted_count(&self) -> u32 {
        self.state.uncounted_count()
    }

    // ============================================================================
    // Edits
    // ============================================================================

    pub fn set_sample_id(&mut self, sample_id: impl Into<String>) {
        self.state.sample_id = sample_id.into();
        self.touch();
    }

    /// Sets density from typed text; blank clears it.
    pub fn set_density_text(&mut self, raw: &str) {
        self.state.density = parse_volume_input(raw);
        self.touch();
    }

    /// Sets a volume from typed text; blank keeps the field empty.
    pub fn set_volume_text(&mut self, field: VolumeField, raw: &str) {
        self.state.set_volume(field, parse_volume_input(raw));
        self.touch();
    }

    pub fn apply_preset(&mut self, preset: VolumePreset) {
        self.state.apply_preset(preset);
        self.touch();
    }

    pub fn set_mode(&mut self, mode: CountingMode) {
        self.state.set_mode(mode);
        self.touch();
    }

    pub fn increment(&mut self, target: CountTarget, kind: CountKind, delta: i64) -> u32 {
        let value = self.state.increment(target, kind, delta);
        self.touch();
        value
    }

    /// Returns false when the text was rejected; nothing changes then.
    pub fn set_direct(&mut self, target: CountTarget, kind: CountKind, raw: &str) -> bool {
        let applied = self.state.set_direct(target, kind, raw);
        if applied {
            self.touch();
        }
        applied
    }

    /// Closing a region's detail view without edits still marks it examined.
    pub fn mark_reviewed(&mut self, target: CountTarget) {
        self.state.mark_reviewed(target);
        self.touch();
    }

    pub fn requires_confirmation(&self, action: Confirmation) -> bool {
        action.is_required(&self.state)
    }

    /// Starts over with defaults.
    ///
    /// Returns false (and changes nothing) when there is unsaved work and the
    /// technician has not confirmed.
    pub fn new_sample(&mut self, confirmed: bool) -> bool {
        if self.requires_confirmation(Confirmation::NewSample) && !confirmed {
            return false;
        }
        self.state.reset();
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.sync.schedule(&self.state);
    }

    // ============================================================================
    // History
    // ============================================================================

    pub async fn save_record(&mut self) -> Result<HistoryRecord> {
        self.save_record_at(Utc::now()).await
    }

    /// Validates the session, appends it to history and clears the session.
    ///
    /// On a validation failure nothing is built or written and the session is
    /// left as it was.
    pub async fn save_record_at(&mut self, now: DateTime<Utc>) -> Result<HistoryRecord> {
        let record = match try_build_record(&self.state, &self.totals(), &self.results(), now) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("[LabSession] Save rejected: {}", e);
                self.notices.raise(NoticeKind::Validation, e.to_string(), now);
                return Err(e.into());
            }
        };

        if let Err(e) = self
            .history_repository
            .add_to_history(self.sync.owner(), &record)
            .await
        {
            tracing::error!("[LabSession] Failed to add record {}: {}", record.id, e);
            self.notices
                .raise(NoticeKind::Persistence, format!("Could not save the record: {}", e), now);
            return Err(e);
        }

        tracing::info!(
            "[LabSession] Saved record {} for sample '{}'",
            record.id,
            record.sample_id
        );
        self.notices.clear();
        self.state.reset();
        self.touch();
        Ok(record)
    }

    /// Deletes one record. Returns false when not confirmed.
    pub async fn delete_record(&mut self, id: &str, confirmed: bool) -> Result<bool> {
        if self.requires_confirmation(Confirmation::DeleteRecord) && !confirmed {
            return Ok(false);
        }

        match self
            .history_repository
            .delete_from_history(self.sync.owner(), id)
            .await
        {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::error!("[LabSession] Failed to delete record {}: {}", id, e);
                self.notices.raise(
                    NoticeKind::Persistence,
                    format!("Could not delete the record: {}", e),
                    Utc::now(),
                );
                Err(e)
            }
        }
    }

    /// Deletes every record, all deletions in parallel.
    ///
    /// Deletions that succeeded stay deleted even if a sibling fails; the
    /// failures come back together as `LabError::Multiple`.
    pub async fn clear_history(&mut self, confirmed: bool) -> Result<usize> {
        if self.requires_confirmation(Confirmation::ClearHistory) && !confirmed {
            return Ok(0);
        }

        let owner = self.sync.owner().clone();
        let records = match self.history_repository.list_history(&owner).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("[LabSession] Failed to read history before clearing: {}", e);
                self.notices.raise(
                    NoticeKind::Persistence,
                    format!("Could not read the history: {}", e),
                    Utc::now(),
                );
                return Err(e);
            }
        };
        let repository = self.history_repository.clone();
        let outcomes = join_all(
            records
                .iter()
                .map(|record| repository.delete_from_history(&owner, &record.id)),
        )
        .await;

        let total = outcomes.len();
        let errors: Vec<LabError> = outcomes.into_iter().filter_map(|r| r.err()).collect();
        if errors.is_empty() {
            tracing::info!("[LabSession] Cleared {} history records", total);
            return Ok(total);
        }

        tracing::error!(
            "[LabSession] {} of {} history deletions failed",
            errors.len(),
            total
        );
        self.notices.raise(
            NoticeKind::Persistence,
            format!("{} of {} records could not be deleted", errors.len(), total),
            Utc::now(),
        );
        Err(LabError::Multiple(errors))
    }

    /// Starts mirroring the stored history into [`Self::history`].
    pub async fn subscribe_history(&mut self) -> Result<()> {
        let view = self.history.clone();
        let subscription = subscribe_to_history(
            self.history_repository.as_ref(),
            self.sync.owner(),
            move |records| {
                *view.write().unwrap_or_else(PoisonError::into_inner) = records;
            },
        )
        .await?;
        self.subscription = Some(subscription);
        Ok(())
    }

    pub fn unsubscribe_history(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Reads the history straight from the store, newest first.
    pub async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
        self.history_repository.list_history(self.sync.owner()).await
    }

    /// Last delivered history, newest first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn active_notice(&self) -> Option<&Notice> {
        self.notices.active(Utc::now())
    }

    pub fn active_notice_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notices.active(now)
    }

    // ============================================================================
    // Teardown
    // ============================================================================

    /// Writes any pending session change immediately.
    pub async fn flush(&self) {
        self.sync.flush().await;
    }

    /// Flushes the session and drops the history subscription.
    pub async fn close(mut self) {
        self.unsubscribe_history();
        self.sync.flush().await;
    }
}
