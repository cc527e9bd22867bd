//! Concentration and viability calculator.

use serde::{Deserialize, Serialize};

use crate::counting::CountingMode;

/// Squares in the full chamber grid.
pub const CHAMBER_SQUARES: f64 = 25.0;
/// Chamber depth/area factor turning a per-square count into cells/mL.
pub const CHAMBER_VOLUME_FACTOR: f64 = 10_000.0;
/// Results are reported in millions of cells per mL.
pub const CELLS_PER_REPORTED_UNIT: f64 = 1_000_000.0;

/// Summed counts of the active counting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub live: u64,
    pub dead: u64,
    pub all: u64,
}

impl Totals {
    pub fn new(live: u64, dead: u64) -> Self {
        Self {
            live,
            dead,
            all: live + dead,
        }
    }
}

/// Reportable metrics, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationResults {
    /// Live cells, millions/mL.
    pub conc_live: f64,
    /// Dead cells, millions/mL.
    pub conc_dead: f64,
    /// All cells, millions/mL.
    pub conc_total: f64,
    /// Percentage of counted cells that are live.
    pub viability: f64,
}

impl ConcentrationResults {
    /// Rounded strings for display. Never fed back into stored values.
    pub fn display(&self) -> DisplayResults {
        DisplayResults {
            conc_live: format!("{:.2}", self.conc_live),
            conc_dead: format!("{:.2}", self.conc_dead),
            conc_total: format!("{:.2}", self.conc_total),
            viability: format!("{:.1}", self.viability),
        }
    }
}

/// Presentation form of [`ConcentrationResults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayResults {
    pub conc_live: String,
    pub conc_dead: String,
    pub conc_total: String,
    pub viability: String,
}

/// Conversion from a raw count to millions of cells per mL.
///
/// The count covers `mode.squares()` squares; it is extrapolated to the full
/// chamber, scaled to mL and corrected for dilution.
pub fn concentration_multiplier(mode: CountingMode, dilution_factor: f64) -> f64 {
    let base_factor = CHAMBER_SQUARES * CHAMBER_VOLUME_FACTOR / f64::from(mode.squares());
    base_factor * dilution_factor / CELLS_PER_REPORTED_UNIT
}

/// Viability in percent; zero when nothing was counted.
pub fn viability(live: u64, dead: u64) -> f64 {
    let all = live + dead;
    if all > 0 {
        live as f64 / all as f64 * 100.0
    } else {
        0.0
    }
}

pub fn compute_results(
    totals: &Totals,
    mode: CountingMode,
    dilution_factor: f64,
) -> ConcentrationResults {
    let multiplier = concentration_multiplier(mode, dilution_factor);
    ConcentrationResults {
        conc_live: totals.live as f64 * multiplier,
        conc_dead: totals.dead as f64 * multiplier,
        conc_total: totals.all as f64 * multiplier,
        viability: viability(totals.live, totals.dead),
    }
}
