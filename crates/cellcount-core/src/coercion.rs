//! Numeric coercion at every storage and input boundary.
//!
//! Stored documents may carry numbers as text (form-bound storage round-trips
//! them that way), and typed input arrives as free text. Everything here turns
//! such values into well-defined numbers, falling back to safe defaults
//! instead of failing.

use serde_json::Value;
use strum::IntoEnumIterator;

use crate::counting::{CountingBoard, CountingMode, Region, RegionCount};
use crate::session::SessionState;
use crate::volume::VolumeConfig;

/// Numeric interpretation of a stored value, or `fallback` when there is none.
///
/// Numbers pass through, text is trimmed and parsed; anything that does not
/// yield a finite number (empty text, `"abc"`, `null`, objects) resolves to
/// `fallback`.
pub fn to_number(value: &Value, fallback: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(fallback)
}

/// Coerces a stored value into a non-negative integer count.
pub fn to_count(value: &Value) -> u32 {
    let n = to_number(value, 0.0);
    if n > 0.0 {
        n.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Loose truthiness of a stored flag.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Rebuilds a region tally from an untyped stored value.
pub fn sanitize_region_count(value: &Value) -> RegionCount {
    RegionCount {
        live: to_count(&value["live"]),
        dead: to_count(&value["dead"]),
        is_counted: is_truthy(&value["isCounted"]),
    }
}

/// Rebuilds a volume from storage: blank text stays blank, missing keys take
/// the default, anything else is coerced (fallback 0) and clamped at zero.
fn sanitize_volume(value: Option<&Value>, default: f64) -> Option<f64> {
    match value {
        None | Some(Value::Null) => Some(default),
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(other) => Some(to_number(other, 0.0).max(0.0)),
    }
}

/// Rebuilds the volume configuration from an untyped stored value.
pub fn sanitize_volumes(value: &Value) -> VolumeConfig {
    let defaults = VolumeConfig::default();
    let field = |key: &str| value.as_object().and_then(|obj| obj.get(key));
    VolumeConfig {
        sample: sanitize_volume(field("sample"), defaults.sample.unwrap_or(0.0)),
        water: sanitize_volume(field("water"), defaults.water.unwrap_or(0.0)),
        aliquot: sanitize_volume(field("aliquot"), defaults.aliquot.unwrap_or(0.0)),
        stain: sanitize_volume(field("stain"), defaults.stain.unwrap_or(0.0)),
    }
}

fn sanitize_density(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => {
            let n = to_number(other, f64::NAN);
            (!n.is_nan()).then_some(n)
        }
    }
}

fn sanitize_sample_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Rebuilds a whole session from a stored document.
///
/// Returns `None` when nothing was stored. Unknown keys (such as the
/// `lastUpdated` stamp added on save) are ignored.
pub fn sanitize_session(raw: Option<&Value>) -> Option<SessionState> {
    let raw = match raw {
        None | Some(Value::Null) => return None,
        Some(raw) => raw,
    };

    let mut board = CountingBoard::new();
    for region in Region::iter() {
        *board.counts.get_mut(region) = sanitize_region_count(&raw["counts"][region.key()]);
    }
    board.global_counts = sanitize_region_count(&raw["globalCounts"]);

    Some(SessionState {
        sample_id: sanitize_sample_id(&raw["sampleId"]),
        volumes: sanitize_volumes(&raw["volumes"]),
        density: sanitize_density(&raw["density"]),
        counting_mode: CountingMode::from_squares(to_number(&raw["countingMode"], 5.0)),
        board,
    })
}

// ============================================================================
// Free-text input filters
// ============================================================================

/// Outcome of filtering a typed count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountInput {
    /// The field was cleared; stored as zero.
    Empty,
    /// Text was typed but contained no digit; keep the previous value.
    Rejected,
    Value(u32),
}

/// Keeps only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Filters a typed count.
pub fn parse_count_input(raw: &str) -> CountInput {
    if raw.is_empty() {
        return CountInput::Empty;
    }
    let digits = digits_only(raw);
    if digits.is_empty() {
        return CountInput::Rejected;
    }
    // Only overflow can fail once the text is all digits.
    CountInput::Value(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Keeps digits and the first decimal point; digits after any later point
/// are folded into the fractional part (`"1.2.3"` becomes `"1.23"`).
pub fn sanitize_volume_text(raw: &str) -> String {
    let mut seen_point = false;
    raw.chars()
        .filter(|ch| match *ch {
            '0'..='9' => true,
            '.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .collect()
}

/// Filters a typed volume. `None` is the blank field.
pub fn parse_volume_input(raw: &str) -> Option<f64> {
    let text = sanitize_volume_text(raw);
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
