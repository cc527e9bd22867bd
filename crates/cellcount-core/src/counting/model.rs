//! Counting domain models.
//!
//! Regions of the counting chamber, the two counting protocols and the
//! per-region tally that the state machine mutates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Counting protocol: how many chamber squares are actually read.
///
/// Serialized as the bare number of squares (`5` or `13`) so stored
/// sessions stay readable by other clients of the same document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CountingMode {
    /// Standard Z pattern: four corners plus the center square.
    #[default]
    FiveSquare,
    /// Low density: the technician sums 13 squares by hand.
    ThirteenSquare,
}

impl CountingMode {
    /// Number of squares read in this mode.
    pub fn squares(self) -> u8 {
        match self {
            Self::FiveSquare => 5,
            Self::ThirteenSquare => 13,
        }
    }

    /// Maps a square count back to a mode; anything other than 13 is the Z pattern.
    pub fn from_squares(squares: f64) -> Self {
        if squares == 13.0 {
            Self::ThirteenSquare
        } else {
            Self::FiveSquare
        }
    }
}

impl From<CountingMode> for u8 {
    fn from(mode: CountingMode) -> Self {
        mode.squares()
    }
}

impl TryFrom<u8> for CountingMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::FiveSquare),
            13 => Ok(Self::ThirteenSquare),
            other => Err(format!("unsupported counting mode: {}", other)),
        }
    }
}

/// One of the five squares read in the Z pattern.
///
/// The short keys (`tl`, `tr`, `c`, `bl`, `br`) are the storage keys.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
pub enum Region {
    #[serde(rename = "tl")]
    #[strum(serialize = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    #[strum(serialize = "tr")]
    TopRight,
    #[serde(rename = "c")]
    #[strum(serialize = "c")]
    Center,
    #[serde(rename = "bl")]
    #[strum(serialize = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    #[strum(serialize = "br")]
    BottomRight,
}

impl Region {
    /// Storage key of the region.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Human-readable label used by the detail view.
    pub fn label(self) -> &'static str {
        match self {
            Self::TopLeft => "Top left",
            Self::TopRight => "Top right",
            Self::Center => "Center",
            Self::BottomLeft => "Bottom left",
            Self::BottomRight => "Bottom right",
        }
    }
}

/// Which tally of a region a mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CountKind {
    Live,
    Dead,
}

/// Target of a counting operation.
///
/// `Total` is the single aggregate used in 13-square mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountTarget {
    Region(Region),
    Total,
}

impl std::str::FromStr for CountTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if key == "total" || key == "global" {
            return Ok(Self::Total);
        }
        key.parse::<Region>()
            .map(Self::Region)
            .map_err(|_| format!("unknown counting target: {}", s))
    }
}

/// Live/dead tally of a single region plus its review flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    pub live: u32,
    pub dead: u32,
    /// Whether the region has been explicitly examined.
    pub is_counted: bool,
}

impl RegionCount {
    pub fn get(&self, kind: CountKind) -> u32 {
        match kind {
            CountKind::Live => self.live,
            CountKind::Dead => self.dead,
        }
    }

    pub fn set(&mut self, kind: CountKind, value: u32) {
        match kind {
            CountKind::Live => self.live = value,
            CountKind::Dead => self.dead = value,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.live) + u64::from(self.dead)
    }
}
