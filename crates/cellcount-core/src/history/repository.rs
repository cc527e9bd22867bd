//! History repository trait.

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::HistoryRecord;
use crate::error::Result;
use crate::identity::Identity;

/// An ordered log of saved records per identity.
///
/// Any session may append or delete by id; nobody edits a stored record.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Appends a record. Failures must be reported, not swallowed.
    ///
    /// A record whose id is already stored is rejected with
    /// `LabError::AlreadyExists` and the stored one is left as it was.
    async fn add_to_history(&self, owner: &Identity, record: &HistoryRecord) -> Result<()>;

    /// Deletes a record by id.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Record deleted
    /// - `Err(LabError::NotFound)`: No record with that id
    /// - `Err(_)`: Storage failure
    async fn delete_from_history(&self, owner: &Identity, id: &str) -> Result<()>;

    /// Current history, newest first.
    async fn list_history(&self, owner: &Identity) -> Result<Vec<HistoryRecord>>;

    /// Live view of the history.
    ///
    /// The receiver starts with the current list and sees the full, newest
    /// first list again after every change.
    async fn watch_history(&self, owner: &Identity) -> Result<watch::Receiver<Vec<HistoryRecord>>>;
}
