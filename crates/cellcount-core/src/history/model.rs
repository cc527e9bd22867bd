//! History record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::counting::CountingMode;
use crate::results::{ConcentrationResults, Totals};
use crate::volume::VolumeAmounts;

/// A saved count. Immutable once created; only deleted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Creation time in Unix milliseconds, as text.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sample_id: String,
    pub mode: CountingMode,
    pub volumes: VolumeAmounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    pub totals: Totals,
    pub results: ConcentrationResults,
    pub dilution_factor: f64,
}

impl HistoryRecord {
    /// Identifier derived from the creation time.
    pub fn id_for(created_at: DateTime<Utc>) -> String {
        created_at.timestamp_millis().to_string()
    }
}

/// Orders records newest first, the order every history listing uses.
pub fn sort_newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}
