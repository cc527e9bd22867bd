//! End-to-end counting sessions over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cellcount_application::{LabSessionUseCase, NoticeKind, subscribe_to_history};
use cellcount_core::config::LabSettings;
use cellcount_core::counting::{CountKind, CountTarget, CountingMode, Region};
use cellcount_core::error::{LabError, Result};
use cellcount_core::history::{HistoryRecord, HistoryRepository, ValidationError};
use cellcount_core::identity::{Identity, StaticIdentityProvider};
use cellcount_core::session::Confirmation;
use cellcount_core::volume::{VolumeField, VolumePreset};
use cellcount_infrastructure::MemoryLabStore;
use chrono::{TimeZone, Utc};
use strum::IntoEnumIterator;
use tokio::sync::watch;

fn owner() -> Identity {
    Identity::new("anon-test")
}

async fn start(store: &Arc<MemoryLabStore>) -> LabSessionUseCase {
    LabSessionUseCase::start(
        &StaticIdentityProvider::new(owner()),
        store.clone(),
        store.clone(),
        &LabSettings::default(),
    )
    .await
    .unwrap()
}

/// 80 live and 20 dead spread over the five squares.
fn count_reference_sample(session: &mut LabSessionUseCase) {
    for region in Region::iter() {
        session.increment(CountTarget::Region(region), CountKind::Live, 16);
        session.increment(CountTarget::Region(region), CountKind::Dead, 4);
    }
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_nothing_starts_without_identity() {
    let store = Arc::new(MemoryLabStore::new());
    let result = LabSessionUseCase::start(
        &StaticIdentityProvider::pending(),
        store.clone(),
        store.clone(),
        &LabSettings::default(),
    )
    .await;

    assert!(matches!(result, Err(LabError::IdentityUnavailable)));
    assert!(store.session_document(&owner()).await.is_none());
}

#[tokio::test]
async fn test_reference_sample_is_saved_to_history() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    assert!(!session.was_restored());
    session.subscribe_history().await.unwrap();

    session.set_sample_id("Vat 12");
    session.apply_preset(VolumePreset::Vat);
    count_reference_sample(&mut session);

    assert_eq!(session.dilution_factor(), 20.0);
    assert_eq!(session.uncounted_count(), 0);
    let display = session.results().display();
    assert_eq!(display.conc_live, "80.00");
    assert_eq!(display.conc_dead, "20.00");
    assert_eq!(display.conc_total, "100.00");
    assert_eq!(display.viability, "80.0");

    let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let record = session.save_record_at(now).await.unwrap();
    assert_eq!(record.id, "1700000000123");
    assert_eq!(record.sample_id, "Vat 12");
    assert_eq!(record.totals.all, 100);
    assert_eq!(record.dilution_factor, 20.0);

    // The session starts over once the record is stored.
    assert!(session.state().sample_id.is_empty());
    assert_eq!(session.uncounted_count(), 5);
    assert!(session.active_notice_at(now).is_none());

    wait_for(|| session.history().len() == 1).await;
    assert_eq!(session.history()[0], record);
    session.close().await;
}

#[tokio::test]
async fn test_validation_failure_keeps_session_and_raises_notice() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    let now = Utc.timestamp_millis_opt(1_000_000).unwrap();

    let err = session.save_record_at(now).await.unwrap_err();
    assert!(matches!(
        err,
        LabError::Validation(ValidationError::MissingSampleId)
    ));

    session.set_sample_id("B-1");
    session.set_volume_text(VolumeField::Sample, "");
    let err = session.save_record_at(now).await.unwrap_err();
    assert!(matches!(err, LabError::Validation(ValidationError::InvalidVolumes)));

    session.set_volume_text(VolumeField::Sample, "1");
    session.increment(CountTarget::Region(Region::Center), CountKind::Live, 3);
    let err = session.save_record_at(now).await.unwrap_err();
    assert!(matches!(
        err,
        LabError::Validation(ValidationError::IncompleteCount { outstanding: 4 })
    ));

    let notice = session.active_notice_at(now).unwrap();
    assert_eq!(notice.kind, NoticeKind::Validation);
    assert_eq!(notice.message, "4 square(s) still need to be counted");
    assert!(
        session
            .active_notice_at(now + chrono::Duration::milliseconds(3_000))
            .is_none()
    );

    assert_eq!(session.state().sample_id, "B-1");
    assert!(store.list_history(&owner()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thirteen_square_mode_uses_aggregate_count() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    session.set_sample_id("F-3");
    session.apply_preset(VolumePreset::Fermenter);
    session.set_mode(CountingMode::ThirteenSquare);
    assert_eq!(session.uncounted_count(), 13);

    assert!(session.set_direct(CountTarget::Total, CountKind::Live, "130"));
    assert!(!session.set_direct(CountTarget::Total, CountKind::Dead, "abc"));
    assert_eq!(session.uncounted_count(), 0);

    let record = session.save_record().await.unwrap();
    assert_eq!(record.mode, CountingMode::ThirteenSquare);
    assert_eq!(record.dilution_factor, 80.0);
    assert_eq!(record.totals.live, 130);
    assert_eq!(record.results.viability, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_edits_are_debounced_and_restored() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;

    session.set_sample_id("V");
    session.set_sample_id("Va");
    session.set_sample_id("Vat 3");
    session.mark_reviewed(CountTarget::Region(Region::TopLeft));
    session.set_density_text("1.05");

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(store.session_document(&owner()).await.is_none());

    tokio::time::sleep(Duration::from_millis(600)).await;
    let doc = store.session_document(&owner()).await.unwrap();
    assert_eq!(doc["sampleId"], "Vat 3");
    assert_eq!(doc["counts"]["tl"]["isCounted"], true);
    assert!(doc["lastUpdated"].is_string());

    let expected = session.state().clone();
    drop(session);

    let restored = start(&store).await;
    assert!(restored.was_restored());
    assert_eq!(restored.state(), &expected);
    assert_eq!(restored.state().density, Some(1.05));
}

#[tokio::test]
async fn test_flush_writes_pending_change_on_close() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    session.increment(CountTarget::Region(Region::BottomRight), CountKind::Dead, 2);
    session.close().await;

    let doc = store.session_document(&owner()).await.unwrap();
    assert_eq!(doc["counts"]["br"]["dead"], 2);
}

#[tokio::test]
async fn test_new_sample_needs_confirmation_only_with_unsaved_work() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;

    assert!(!session.requires_confirmation(Confirmation::NewSample));
    assert!(session.new_sample(false));

    session.increment(CountTarget::Region(Region::TopRight), CountKind::Live, 1);
    assert!(session.requires_confirmation(Confirmation::NewSample));
    assert!(!session.new_sample(false));
    assert_eq!(session.totals().live, 1);

    assert!(session.new_sample(true));
    assert_eq!(session.totals().all, 0);
    assert!(session.requires_confirmation(Confirmation::DeleteRecord));
    assert!(session.requires_confirmation(Confirmation::ClearHistory));
}

#[tokio::test]
async fn test_delete_record_requires_confirmation() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    session.set_sample_id("D");
    count_reference_sample(&mut session);
    let record = session.save_record().await.unwrap();

    assert!(!session.delete_record(&record.id, false).await.unwrap());
    assert_eq!(store.list_history(&owner()).await.unwrap().len(), 1);

    assert!(session.delete_record(&record.id, true).await.unwrap());
    assert!(store.list_history(&owner()).await.unwrap().is_empty());

    let err = session.delete_record(&record.id, true).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        session.active_notice().map(|n| n.kind),
        Some(NoticeKind::Persistence)
    );
}

/// Delegates to the memory store but refuses to delete one id, and
/// optionally refuses to list anything.
struct FlakyHistory {
    inner: Arc<MemoryLabStore>,
    refuse: String,
    listing_fails: bool,
}

#[async_trait]
impl HistoryRepository for FlakyHistory {
    async fn add_to_history(&self, owner: &Identity, record: &HistoryRecord) -> Result<()> {
        self.inner.add_to_history(owner, record).await
    }

    async fn delete_from_history(&self, owner: &Identity, id: &str) -> Result<()> {
        if id == self.refuse {
            return Err(LabError::data_access("permission denied"));
        }
        self.inner.delete_from_history(owner, id).await
    }

    async fn list_history(&self, owner: &Identity) -> Result<Vec<HistoryRecord>> {
        if self.listing_fails {
            return Err(LabError::io("history directory unreadable"));
        }
        self.inner.list_history(owner).await
    }

    async fn watch_history(&self, owner: &Identity) -> Result<watch::Receiver<Vec<HistoryRecord>>> {
        self.inner.watch_history(owner).await
    }
}

#[tokio::test]
async fn test_clear_history_keeps_successful_deletions() {
    let store = Arc::new(MemoryLabStore::new());
    let history = Arc::new(FlakyHistory {
        inner: store.clone(),
        refuse: "2000".into(),
        listing_fails: false,
    });
    let mut session = LabSessionUseCase::start(
        &StaticIdentityProvider::new(owner()),
        store.clone(),
        history,
        &LabSettings::default(),
    )
    .await
    .unwrap();

    for millis in [1_000, 2_000, 3_000] {
        session.set_sample_id(format!("S{}", millis));
        count_reference_sample(&mut session);
        session
            .save_record_at(Utc.timestamp_millis_opt(millis).unwrap())
            .await
            .unwrap();
    }

    assert_eq!(session.clear_history(false).await.unwrap(), 0);
    assert_eq!(store.list_history(&owner()).await.unwrap().len(), 3);

    match session.clear_history(true).await {
        Err(LabError::Multiple(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected a partial failure, got {:?}", other.map(|_| ())),
    }
    let remaining = store.list_history(&owner()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "2000");
    assert_eq!(
        session.active_notice().map(|n| n.message.clone()),
        Some("1 of 3 records could not be deleted".to_string())
    );
}

#[tokio::test]
async fn test_clear_history_reports_unreadable_history() {
    let store = Arc::new(MemoryLabStore::new());
    let history = Arc::new(FlakyHistory {
        inner: store.clone(),
        refuse: String::new(),
        listing_fails: true,
    });
    let mut session = LabSessionUseCase::start(
        &StaticIdentityProvider::new(owner()),
        store.clone(),
        history,
        &LabSettings::default(),
    )
    .await
    .unwrap();

    let err = session.clear_history(true).await.unwrap_err();
    assert!(err.is_persistence());
    assert_eq!(
        session.active_notice().map(|n| n.kind),
        Some(NoticeKind::Persistence)
    );
}

#[tokio::test]
async fn test_save_in_same_millisecond_keeps_first_record() {
    let store = Arc::new(MemoryLabStore::new());
    let mut session = start(&store).await;
    let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

    session.set_sample_id("First");
    count_reference_sample(&mut session);
    session.save_record_at(now).await.unwrap();

    session.set_sample_id("Second");
    count_reference_sample(&mut session);
    let err = session.save_record_at(now).await.unwrap_err();
    assert!(err.is_already_exists());
    assert_eq!(
        session.active_notice_at(now).map(|n| n.kind),
        Some(NoticeKind::Persistence)
    );
    assert_eq!(session.state().sample_id, "Second");

    let stored = store.list_history(&owner()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].sample_id, "First");
}

#[tokio::test]
async fn test_subscription_stops_after_unsubscribe() {
    let store = Arc::new(MemoryLabStore::new());
    let deliveries = Arc::new(std::sync::Mutex::new(Vec::<usize>::new()));
    let seen = deliveries.clone();
    let subscription = subscribe_to_history(store.as_ref(), &owner(), move |records| {
        seen.lock().unwrap().push(records.len());
    })
    .await
    .unwrap();

    wait_for(|| deliveries.lock().unwrap().len() == 1).await;
    assert!(subscription.is_active());

    let mut session = start(&store).await;
    session.set_sample_id("X");
    count_reference_sample(&mut session);
    session.save_record().await.unwrap();
    wait_for(|| deliveries.lock().unwrap().last() == Some(&1)).await;

    subscription.unsubscribe();
    session.set_sample_id("Y");
    count_reference_sample(&mut session);
    session.save_record_at(Utc::now() + chrono::Duration::seconds(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(*deliveries.lock().unwrap(), vec![0, 1]);
    assert_eq!(store.list_history(&owner()).await.unwrap().len(), 2);
}
