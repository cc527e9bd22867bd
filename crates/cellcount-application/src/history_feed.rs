//! Push-based history subscription with an explicit disposal handle.

use cellcount_core::error::Result;
use cellcount_core::history::{HistoryRecord, HistoryRepository};
use cellcount_core::identity::Identity;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Live subscription to the history log.
///
/// Dropping the handle unsubscribes.
pub struct HistorySubscription {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl HistorySubscription {
    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for HistorySubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Calls `callback` with the full newest-first list, first with the current
/// state and then after every change. Each delivery replaces the previous one.
pub async fn subscribe_to_history<F>(
    repository: &dyn HistoryRepository,
    owner: &Identity,
    callback: F,
) -> Result<HistorySubscription>
where
    F: Fn(Vec<HistoryRecord>) + Send + 'static,
{
    let mut receiver = repository.watch_history(owner).await?;
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let owner = owner.clone();

    let task = tokio::spawn(async move {
        loop {
            let records = receiver.borrow_and_update().clone();
            tracing::debug!("[HistoryFeed] Delivering {} records to {}", records.len(), owner);
            callback(records);

            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                changed = receiver.changed() => {
                    if changed.is_err() {
                        tracing::debug!("[HistoryFeed] History source closed for {}", owner);
                        break;
                    }
                }
            }
        }
    });

    Ok(HistorySubscription { token, task })
}
