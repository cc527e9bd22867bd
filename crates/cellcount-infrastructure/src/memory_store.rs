//! In-memory document store.
//!
//! Implements both repositories over process memory. Used by tests and by
//! callers that want a throwaway session.

use std::collections::HashMap;

use async_trait::async_trait;
use cellcount_core::error::{LabError, Result};
use cellcount_core::history::{HistoryRecord, HistoryRepository, sort_newest_first};
use cellcount_core::identity::Identity;
use cellcount_core::session::SessionRepository;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{RwLock, watch};

use crate::storage::merge_session_document;

/// Session documents and history logs keyed by identity.
///
/// Each identity's history lives inside its `watch::Sender`, so every
/// change is visible to subscribers as soon as the write lock is released.
#[derive(Default)]
pub struct MemoryLabStore {
    sessions: RwLock<HashMap<Identity, Value>>,
    history: RwLock<HashMap<Identity, watch::Sender<Vec<HistoryRecord>>>>,
}

impl MemoryLabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw session document, for inspection.
    pub async fn session_document(&self, owner: &Identity) -> Option<Value> {
        self.sessions.read().await.get(owner).cloned()
    }
}

#[async_trait]
impl SessionRepository for MemoryLabStore {
    async fn save_session(&self, owner: &Identity, data: Value) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let existing = sessions.remove(owner);
        sessions.insert(owner.clone(), merge_session_document(existing, data, Utc::now()));
        Ok(())
    }

    async fn load_session(&self, owner: &Identity) -> Result<Option<Value>> {
        Ok(self.sessions.read().await.get(owner).cloned())
    }
}

#[async_trait]
impl HistoryRepository for MemoryLabStore {
    async fn add_to_history(&self, owner: &Identity, record: &HistoryRecord) -> Result<()> {
        let mut history = self.history.write().await;
        let sender = history
            .entry(owner.clone())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        if sender.borrow().iter().any(|r| r.id == record.id) {
            return Err(LabError::already_exists("history record", &record.id));
        }
        sender.send_modify(|records| {
            records.push(record.clone());
            sort_newest_first(records);
        });
        Ok(())
    }

    async fn delete_from_history(&self, owner: &Identity, id: &str) -> Result<()> {
        let history = self.history.read().await;
        let sender = history
            .get(owner)
            .ok_or_else(|| LabError::not_found("history record", id))?;

        let removed = sender.send_if_modified(|records| {
            let before = records.len();
            records.retain(|r| r.id != id);
            records.len() != before
        });
        if removed {
            Ok(())
        } else {
            Err(LabError::not_found("history record", id))
        }
    }

    async fn list_history(&self, owner: &Identity) -> Result<Vec<HistoryRecord>> {
        Ok(self
            .history
            .read()
            .await
            .get(owner)
            .map(|sender| sender.borrow().clone())
            .unwrap_or_default())
    }

    async fn watch_history(&self, owner: &Identity) -> Result<watch::Receiver<Vec<HistoryRecord>>> {
        let mut history = self.history.write().await;
        let sender = history
            .entry(owner.clone())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        Ok(sender.subscribe())
    }
}
