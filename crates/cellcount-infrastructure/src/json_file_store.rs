//! JSON-file document store.
//!
//! Persists the current session and the history log below a
//! [`StorageLayout`]:
//!
//! ```text
//! environments/<namespace>/users/<identity>/
//! ├── sessions/current-session.json
//! └── history/<id>.json
//! ```
//!
//! Every file is written through [`AtomicJsonFile`].

use std::collections::HashMap;

use async_trait::async_trait;
use cellcount_core::error::{LabError, Result};
use cellcount_core::history::{HistoryRecord, HistoryRepository, sort_newest_first};
use cellcount_core::identity::Identity;
use cellcount_core::session::SessionRepository;
use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tokio::sync::{Mutex, watch};

use crate::paths::StorageLayout;
use crate::storage::{AtomicJsonFile, merge_session_document};

pub struct JsonFileLabStore {
    layout: StorageLayout,
    /// Serializes read-merge-write of session documents.
    session_lock: Mutex<()>,
    /// Serializes the exists-then-write of new history records.
    history_lock: Mutex<()>,
    watchers: Mutex<HashMap<Identity, watch::Sender<Vec<HistoryRecord>>>>,
}

impl JsonFileLabStore {
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            session_lock: Mutex::new(()),
            history_lock: Mutex::new(()),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    async fn read_history(&self, owner: &Identity) -> Result<Vec<HistoryRecord>> {
        let dir = self.layout.history_dir(owner);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let value = match AtomicJsonFile::new(path.clone()).load().await {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        "[JsonFileLabStore] Skipping unparsable record {}: {}",
                        path.display(),
                        e
                    );
                    continue;
                }
            };
            match serde_json::from_value::<HistoryRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "[JsonFileLabStore] Skipping unreadable record {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Pushes the on-disk history to any subscriber of `owner`.
    async fn notify(&self, owner: &Identity) {
        let watchers = self.watchers.lock().await;
        let Some(sender) = watchers.get(owner) else {
            return;
        };
        match self.read_history(owner).await {
            Ok(records) => {
                sender.send_replace(records);
            }
            Err(e) => {
                tracing::warn!("[JsonFileLabStore] Failed to refresh history feed: {}", e);
            }
        }
    }
}

#[async_trait]
impl SessionRepository for JsonFileLabStore {
    async fn save_session(&self, owner: &Identity, data: Value) -> Result<()> {
        let _guard = self.session_lock.lock().await;
        let file = AtomicJsonFile::new(self.layout.session_file(owner));
        let existing = match file.load().await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(
                    "[JsonFileLabStore] Replacing unreadable session {}: {}",
                    file.path().display(),
                    e
                );
                None
            }
        };
        file.save(&merge_session_document(existing, data, Utc::now()))
            .await
    }

    async fn load_session(&self, owner: &Identity) -> Result<Option<Value>> {
        AtomicJsonFile::new(self.layout.session_file(owner))
            .load()
            .await
    }
}

#[async_trait]
impl HistoryRepository for JsonFileLabStore {
    async fn add_to_history(&self, owner: &Identity, record: &HistoryRecord) -> Result<()> {
        let value = serde_json::to_value(record)?;
        let path = self.layout.history_file(owner, &record.id);
        {
            let _guard = self.history_lock.lock().await;
            if fs::try_exists(&path).await? {
                return Err(LabError::already_exists("history record", &record.id));
            }
            AtomicJsonFile::new(path).save(&value).await?;
        }
        tracing::debug!("[JsonFileLabStore] Stored record {}", record.id);
        self.notify(owner).await;
        Ok(())
    }

    async fn delete_from_history(&self, owner: &Identity, id: &str) -> Result<()> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(LabError::not_found("history record", id));
        }
        match AtomicJsonFile::new(self.layout.history_file(owner, id))
            .remove()
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Err(LabError::not_found("history record", id)),
            Err(e) => return Err(e),
        }
        tracing::debug!("[JsonFileLabStore] Deleted record {}", id);
        self.notify(owner).await;
        Ok(())
    }

    async fn list_history(&self, owner: &Identity) -> Result<Vec<HistoryRecord>> {
        self.read_history(owner).await
    }

    async fn watch_history(&self, owner: &Identity) -> Result<watch::Receiver<Vec<HistoryRecord>>> {
        let current = self.read_history(owner).await?;
        let mut watchers = self.watchers.lock().await;
        let sender = watchers
            .entry(owner.clone())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        sender.send_replace(current);
        Ok(sender.subscribe())
    }
}
