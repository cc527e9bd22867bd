//! Session domain model.
//!
//! The in-progress counting record owned by the active editing context.

use serde::{Deserialize, Serialize};

use crate::counting::{CountKind, CountTarget, CountingBoard, CountingMode};
use crate::results::{ConcentrationResults, Totals, compute_results};
use crate::volume::{VolumeConfig, VolumeField, VolumePreset, blank_number, compute_dilution_factor};

/// Mutable state of the sample being counted.
///
/// Derived values (dilution factor, totals, results) are recomputed on demand
/// from the current state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Free-text sample identifier, e.g. the vat number.
    pub sample_id: String,
    pub volumes: VolumeConfig,
    /// Must density, informational only.
    #[serde(with = "blank_number")]
    pub density: Option<f64>,
    pub counting_mode: CountingMode,
    #[serde(flatten)]
    pub board: CountingBoard,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dilution_factor(&self) -> f64 {
        compute_dilution_factor(&self.volumes)
    }

    pub fn totals(&self) -> Totals {
        self.board.totals(self.counting_mode)
    }

    pub fn results(&self) -> ConcentrationResults {
        compute_results(&self.totals(), self.counting_mode, self.dilution_factor())
    }

    /// Outstanding review work in the active mode.
    pub fn uncounted_count(&self) -> u32 {
        self.board.uncounted_count(self.counting_mode)
    }

    pub fn set_volume(&mut self, field: VolumeField, value: Option<f64>) {
        self.volumes.set(field, value);
    }

    /// Loads a stock protocol; stock protocols are read in the Z pattern.
    pub fn apply_preset(&mut self, preset: VolumePreset) {
        self.volumes = preset.volumes();
        self.counting_mode = CountingMode::FiveSquare;
    }

    /// Switches the active mode without clearing the other mode's tallies.
    pub fn set_mode(&mut self, mode: CountingMode) {
        self.counting_mode = mode;
    }

    pub fn increment(&mut self, target: CountTarget, kind: CountKind, delta: i64) -> u32 {
        self.board.increment(target, kind, delta)
    }

    pub fn set_direct(&mut self, target: CountTarget, kind: CountKind, raw: &str) -> bool {
        self.board.set_direct(target, kind, raw)
    }

    pub fn mark_reviewed(&mut self, target: CountTarget) {
        self.board.mark_reviewed(target);
    }

    /// Back to a blank sample with default volumes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether starting a new sample would discard work.
    pub fn has_unsaved_work(&self) -> bool {
        !self.sample_id.trim().is_empty() || self.board.has_any_count()
    }
}

/// Destructive actions that may need the technician to confirm first.
///
/// The trigger conditions differ per action and are kept separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Discard the current session and start over.
    NewSample,
    /// Delete one history record.
    DeleteRecord,
    /// Delete every history record.
    ClearHistory,
}

impl Confirmation {
    pub fn is_required(self, session: &SessionState) -> bool {
        match self {
            Self::NewSample => session.has_unsaved_work(),
            Self::DeleteRecord | Self::ClearHistory => true,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::NewSample => "Discard the current counts and start a new sample?",
            Self::DeleteRecord => "Delete this record from the history?",
            Self::ClearHistory => "Delete every record in the history?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counting::Region;
    use serde_json::json;

    #[test]
    fn test_default_session() {
        let session = SessionState::new();
        assert!(session.sample_id.is_empty());
        assert_eq!(session.volumes, VolumeConfig::default());
        assert_eq!(session.counting_mode, CountingMode::FiveSquare);
        assert_eq!(session.dilution_factor(), 20.0);
        assert_eq!(session.uncounted_count(), 5);
    }

    #[test]
    fn test_stored_shape() {
        let mut session = SessionState::new();
        session.sample_id = "Vat 7".to_string();
        session.increment(CountTarget::Region(Region::Center), CountKind::Live, 2);

        let stored = serde_json::to_value(&session).unwrap();
        assert_eq!(stored["sampleId"], json!("Vat 7"));
        assert_eq!(stored["density"], json!(""));
        assert_eq!(stored["countingMode"], json!(5));
        assert_eq!(stored["counts"]["c"], json!({"live": 2, "dead": 0, "isCounted": true}));
        assert_eq!(stored["globalCounts"]["isCounted"], json!(false));
    }

    #[test]
    fn test_mode_switch_keeps_other_mode_data() {
        let mut session = SessionState::new();
        session.increment(CountTarget::Region(Region::TopLeft), CountKind::Live, 4);
        session.set_mode(CountingMode::ThirteenSquare);
        session.set_direct(CountTarget::Total, CountKind::Live, "50");
        assert_eq!(session.totals().live, 50);

        session.set_mode(CountingMode::FiveSquare);
        assert_eq!(session.totals().live, 4);
    }

    #[test]
    fn test_preset_selects_five_square_mode() {
        let mut session = SessionState::new();
        session.set_mode(CountingMode::ThirteenSquare);
        session.apply_preset(VolumePreset::Fermenter);
        assert_eq!(session.counting_mode, CountingMode::FiveSquare);
        assert_eq!(session.dilution_factor(), 80.0);
    }

    #[test]
    fn test_new_sample_confirmation_trigger() {
        let mut session = SessionState::new();
        assert!(!Confirmation::NewSample.is_required(&session));

        session.mark_reviewed(CountTarget::Total);
        assert!(!Confirmation::NewSample.is_required(&session));

        session.sample_id = "  ".to_string();
        assert!(!Confirmation::NewSample.is_required(&session));

        session.sample_id = "F2".to_string();
        assert!(Confirmation::NewSample.is_required(&session));

        session.reset();
        session.set_direct(CountTarget::Total, CountKind::Dead, "1");
        assert!(Confirmation::NewSample.is_required(&session));
    }

    #[test]
    fn test_delete_always_confirms() {
        let session = SessionState::new();
        assert!(Confirmation::DeleteRecord.is_required(&session));
        assert!(Confirmation::ClearHistory.is_required(&session));
    }
}
