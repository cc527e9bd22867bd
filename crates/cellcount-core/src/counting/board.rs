//! Counting state machine.
//!
//! Each region (and the 13-square aggregate) moves from *unreviewed* to
//! *reviewed* on any explicit interaction. Counts never go below zero.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::model::{CountKind, CountTarget, CountingMode, Region, RegionCount};
use crate::coercion::{CountInput, parse_count_input};
use crate::results::Totals;

/// The five Z-pattern regions, stored under their short keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionCounts {
    pub tl: RegionCount,
    pub tr: RegionCount,
    pub c: RegionCount,
    pub bl: RegionCount,
    pub br: RegionCount,
}

impl RegionCounts {
    pub fn get(&self, region: Region) -> &RegionCount {
        match region {
            Region::TopLeft => &self.tl,
            Region::TopRight => &self.tr,
            Region::Center => &self.c,
            Region::BottomLeft => &self.bl,
            Region::BottomRight => &self.br,
        }
    }

    pub fn get_mut(&mut self, region: Region) -> &mut RegionCount {
        match region {
            Region::TopLeft => &mut self.tl,
            Region::TopRight => &mut self.tr,
            Region::Center => &mut self.c,
            Region::BottomLeft => &mut self.bl,
            Region::BottomRight => &mut self.br,
        }
    }

    /// Iterates regions in reading order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &RegionCount)> + '_ {
        Region::iter().map(move |region| (region, self.get(region)))
    }
}

/// Raw tallies for both counting modes.
///
/// Switching modes never clears the other mode's data; only the active
/// mode feeds totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingBoard {
    pub counts: RegionCounts,
    pub global_counts: RegionCount,
}

impl CountingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, target: CountTarget) -> &RegionCount {
        match target {
            CountTarget::Region(region) => self.counts.get(region),
            CountTarget::Total => &self.global_counts,
        }
    }

    fn cell_mut(&mut self, target: CountTarget) -> &mut RegionCount {
        match target {
            CountTarget::Region(region) => self.counts.get_mut(region),
            CountTarget::Total => &mut self.global_counts,
        }
    }

    /// Adds `delta` to a tally, clamping at zero, and marks the target reviewed.
    ///
    /// Returns the new value.
    pub fn increment(&mut self, target: CountTarget, kind: CountKind, delta: i64) -> u32 {
        let cell = self.cell_mut(target);
        let next = i64::from(cell.get(kind))
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX));
        let next = next as u32;
        cell.set(kind, next);
        cell.is_counted = true;
        next
    }

    /// Sets a tally from free text typed by the technician.
    ///
    /// Empty text stores zero. Text without any digit is rejected and leaves
    /// the board untouched. Returns whether the input was applied.
    pub fn set_direct(&mut self, target: CountTarget, kind: CountKind, raw: &str) -> bool {
        let value = match parse_count_input(raw) {
            CountInput::Empty => 0,
            CountInput::Value(value) => value,
            CountInput::Rejected => return false,
        };
        let cell = self.cell_mut(target);
        cell.set(kind, value);
        cell.is_counted = true;
        true
    }

    /// Marks a target as examined without touching its counts.
    pub fn mark_reviewed(&mut self, target: CountTarget) {
        self.cell_mut(target).is_counted = true;
    }

    /// Clears every region and the aggregate back to `{0, 0, false}`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Outstanding work for the given mode.
    ///
    /// The 13-square aggregate reports 13 while unreviewed, not 1.
    pub fn uncounted_count(&self, mode: CountingMode) -> u32 {
        match mode {
            CountingMode::FiveSquare => {
                self.counts.iter().filter(|(_, cell)| !cell.is_counted).count() as u32
            }
            CountingMode::ThirteenSquare => {
                if self.global_counts.is_counted {
                    0
                } else {
                    u32::from(CountingMode::ThirteenSquare.squares())
                }
            }
        }
    }

    /// Regions of the Z pattern still waiting for review.
    pub fn uncounted_regions(&self) -> Vec<Region> {
        self.counts
            .iter()
            .filter(|(_, cell)| !cell.is_counted)
            .map(|(region, _)| region)
            .collect()
    }

    /// Summed live/dead counts of the active mode.
    pub fn totals(&self, mode: CountingMode) -> Totals {
        match mode {
            CountingMode::FiveSquare => {
                let (live, dead) = self.counts.iter().fold((0u64, 0u64), |(l, d), (_, c)| {
                    (l + u64::from(c.live), d + u64::from(c.dead))
                });
                Totals::new(live, dead)
            }
            CountingMode::ThirteenSquare => Totals::new(
                u64::from(self.global_counts.live),
                u64::from(self.global_counts.dead),
            ),
        }
    }

    /// True when any tally of either mode is non-zero.
    pub fn has_any_count(&self) -> bool {
        self.global_counts.total() > 0 || self.counts.iter().any(|(_, cell)| cell.total() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: CountTarget = CountTarget::Region(Region::Center);

    #[test]
    fn test_increment_marks_reviewed() {
        let mut board = CountingBoard::new();
        assert_eq!(board.increment(CENTER, CountKind::Live, 1), 1);
        assert!(board.cell(CENTER).is_counted);
    }

    #[test]
    fn test_decrement_clamps_at_zero() {
        let mut board = CountingBoard::new();
        for _ in 0..5 {
            board.increment(CENTER, CountKind::Live, -1);
        }
        assert_eq!(board.cell(CENTER).live, 0);
        assert!(board.cell(CENTER).is_counted);

        board.increment(CENTER, CountKind::Dead, 3);
        board.increment(CENTER, CountKind::Dead, -10);
        assert_eq!(board.cell(CENTER).dead, 0);
    }

    #[test]
    fn test_extreme_deltas_saturate() {
        let mut board = CountingBoard::new();
        board.increment(CENTER, CountKind::Live, 1);
        assert_eq!(board.increment(CENTER, CountKind::Live, i64::MAX), u32::MAX);
        assert_eq!(board.increment(CENTER, CountKind::Live, i64::MAX), u32::MAX);

        board.increment(CENTER, CountKind::Dead, 7);
        assert_eq!(board.increment(CENTER, CountKind::Dead, i64::MIN), 0);
        assert!(board.cell(CENTER).is_counted);
    }

    #[test]
    fn test_set_direct_filters_digits() {
        let mut board = CountingBoard::new();
        assert!(board.set_direct(CENTER, CountKind::Live, "12a3"));
        assert_eq!(board.cell(CENTER).live, 123);
    }

    #[test]
    fn test_set_direct_rejects_non_numeric_text() {
        let mut board = CountingBoard::new();
        board.set_direct(CENTER, CountKind::Live, "40");
        let before = board;

        assert!(!board.set_direct(CENTER, CountKind::Live, "--"));
        assert_eq!(board, before);

        let mut fresh = CountingBoard::new();
        assert!(!fresh.set_direct(CENTER, CountKind::Dead, "abc"));
        assert!(!fresh.cell(CENTER).is_counted);
    }

    #[test]
    fn test_set_direct_empty_stores_zero_and_reviews() {
        let mut board = CountingBoard::new();
        board.set_direct(CountTarget::Total, CountKind::Dead, "17");
        assert!(board.set_direct(CountTarget::Total, CountKind::Dead, ""));
        assert_eq!(board.global_counts.dead, 0);
        assert!(board.global_counts.is_counted);
    }

    #[test]
    fn test_mark_reviewed_keeps_counts() {
        let mut board = CountingBoard::new();
        board.mark_reviewed(CountTarget::Region(Region::TopLeft));
        let cell = board.cell(CountTarget::Region(Region::TopLeft));
        assert_eq!((cell.live, cell.dead, cell.is_counted), (0, 0, true));
    }

    #[test]
    fn test_uncounted_count_per_mode() {
        let mut board = CountingBoard::new();
        assert_eq!(board.uncounted_count(CountingMode::FiveSquare), 5);
        assert_eq!(board.uncounted_count(CountingMode::ThirteenSquare), 13);

        board.mark_reviewed(CountTarget::Region(Region::TopLeft));
        board.mark_reviewed(CountTarget::Region(Region::BottomRight));
        assert_eq!(board.uncounted_count(CountingMode::FiveSquare), 3);
        assert_eq!(
            board.uncounted_regions(),
            vec![Region::TopRight, Region::Center, Region::BottomLeft]
        );

        board.mark_reviewed(CountTarget::Total);
        assert_eq!(board.uncounted_count(CountingMode::ThirteenSquare), 0);
    }

    #[test]
    fn test_totals_follow_active_mode_only() {
        let mut board = CountingBoard::new();
        board.increment(CountTarget::Region(Region::TopLeft), CountKind::Live, 10);
        board.increment(CountTarget::Region(Region::Center), CountKind::Dead, 4);
        board.set_direct(CountTarget::Total, CountKind::Live, "99");

        let five = board.totals(CountingMode::FiveSquare);
        assert_eq!((five.live, five.dead, five.all), (10, 4, 14));

        let thirteen = board.totals(CountingMode::ThirteenSquare);
        assert_eq!((thirteen.live, thirteen.dead, thirteen.all), (99, 0, 99));
    }

    #[test]
    fn test_reset_returns_to_unreviewed_zero() {
        let mut board = CountingBoard::new();
        board.increment(CENTER, CountKind::Live, 8);
        board.mark_reviewed(CountTarget::Total);
        assert!(board.has_any_count());

        board.reset();
        assert_eq!(board, CountingBoard::default());
        assert!(!board.has_any_count());
    }
}
