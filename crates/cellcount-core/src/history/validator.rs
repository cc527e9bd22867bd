//! Record validation: the gate between an in-progress session and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::HistoryRecord;
use crate::counting::CountingMode;
use crate::results::{ConcentrationResults, Totals};
use crate::session::SessionState;

/// Why a session cannot be saved yet. The message is shown to the technician.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Enter a sample ID before saving")]
    MissingSampleId,

    #[error("Sample and aliquot volumes must be greater than zero")]
    InvalidVolumes,

    #[error("{outstanding} square(s) still need to be counted")]
    IncompleteCount { outstanding: u32 },
}

/// Checks the session and snapshots it into a new record.
///
/// Rules apply in order and the first failure wins: sample id, volumes,
/// completeness. Nothing is mutated either way.
pub fn try_build_record(
    session: &SessionState,
    totals: &Totals,
    results: &ConcentrationResults,
    created_at: DateTime<Utc>,
) -> Result<HistoryRecord, ValidationError> {
    let sample_id = session.sample_id.trim();
    if sample_id.is_empty() {
        return Err(ValidationError::MissingSampleId);
    }

    if !session.volumes.is_configured() {
        return Err(ValidationError::InvalidVolumes);
    }

    let complete = match session.counting_mode {
        CountingMode::FiveSquare => session.board.counts.iter().all(|(_, c)| c.is_counted),
        CountingMode::ThirteenSquare => session.board.global_counts.is_counted,
    };
    if !complete {
        return Err(ValidationError::IncompleteCount {
            outstanding: session.uncounted_count(),
        });
    }

    Ok(HistoryRecord {
        id: HistoryRecord::id_for(created_at),
        timestamp: created_at,
        sample_id: sample_id.to_string(),
        mode: session.counting_mode,
        volumes: session.volumes.amounts(),
        density: session.density,
        totals: *totals,
        results: *results,
        dilution_factor: session.dilution_factor(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::{CountKind, CountTarget, Region};
    use crate::volume::VolumeField;
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn build(session: &SessionState) -> Result<HistoryRecord, ValidationError> {
        try_build_record(session, &session.totals(), &session.results(), at())
    }

    fn counted_session() -> SessionState {
        let mut session = SessionState::new();
        session.sample_id = " Vat 12 ".to_string();
        for region in Region::iter() {
            let target = CountTarget::Region(region);
            session.set_direct(target, CountKind::Live, "16");
            session.set_direct(target, CountKind::Dead, "4");
        }
        session
    }

    #[test]
    fn test_reference_record() {
        let session = counted_session();
        let record = build(&session).unwrap();

        assert_eq!(record.sample_id, "Vat 12");
        assert_eq!(record.id, at().timestamp_millis().to_string());
        assert_eq!(record.dilution_factor, 20.0);
        assert_eq!(record.totals, Totals::new(80, 20));
        assert_eq!(record.results.conc_total, 100.0);
        assert_eq!(record.results.viability, 80.0);
        assert_eq!(record.volumes.water, 9.0);
        assert!(record.density.is_none());
    }

    #[test]
    fn test_density_snapshot_only_when_set() {
        let mut session = counted_session();
        session.density = Some(1.08);
        let record = build(&session).unwrap();
        assert_eq!(record.density, Some(1.08));

        let stored = serde_json::to_value(&build(&counted_session()).unwrap()).unwrap();
        assert!(stored.get("density").is_none());
    }

    #[test]
    fn test_missing_sample_id_checked_first() {
        let mut session = SessionState::new();
        session.sample_id = "   ".to_string();
        session.set_volume(VolumeField::Sample, None);
        assert_eq!(build(&session), Err(ValidationError::MissingSampleId));
    }

    #[test]
    fn test_invalid_volumes_before_completeness() {
        let mut session = SessionState::new();
        session.sample_id = "F1".to_string();
        session.set_volume(VolumeField::Aliquot, Some(0.0));
        assert_eq!(build(&session), Err(ValidationError::InvalidVolumes));
    }

    #[test]
    fn test_incomplete_five_square_reports_outstanding() {
        let mut session = SessionState::new();
        session.sample_id = "F1".to_string();
        session.mark_reviewed(CountTarget::Region(Region::TopLeft));
        session.mark_reviewed(CountTarget::Region(Region::Center));
        assert_eq!(
            build(&session),
            Err(ValidationError::IncompleteCount { outstanding: 3 })
        );
    }

    #[test]
    fn test_incomplete_thirteen_square_reports_thirteen() {
        let mut session = counted_session();
        session.set_mode(CountingMode::ThirteenSquare);
        let err = build(&session).unwrap_err();
        assert_eq!(err, ValidationError::IncompleteCount { outstanding: 13 });
        assert_eq!(err.to_string(), "13 square(s) still need to be counted");

        session.mark_reviewed(CountTarget::Total);
        let record = build(&session).unwrap();
        assert_eq!(record.mode, CountingMode::ThirteenSquare);
        assert_eq!(record.totals.all, 0);
        assert_eq!(record.results.viability, 0.0);
    }

    #[test]
    fn test_failure_leaves_session_untouched() {
        let mut session = SessionState::new();
        session.sample_id = "F1".to_string();
        let before = session.clone();
        let _ = build(&session);
        assert_eq!(session, before);
    }
}
