//! Dilution volume models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The four volumes (mL) describing how the sample was diluted and stained.
///
/// `None` is a blank input field. Blank fields are kept distinct from zero so
/// the form can show an empty box while the technician is typing; arithmetic
/// treats them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(with = "blank_number")]
    pub sample: Option<f64>,
    #[serde(with = "blank_number")]
    pub water: Option<f64>,
    #[serde(with = "blank_number")]
    pub aliquot: Option<f64>,
    #[serde(with = "blank_number")]
    pub stain: Option<f64>,
}

impl Default for VolumeConfig {
    /// A 1:10 dilution followed by a 1:1 stain.
    fn default() -> Self {
        Self::from_amounts(VolumeAmounts {
            sample: 1.0,
            water: 9.0,
            aliquot: 1.0,
            stain: 1.0,
        })
    }
}

impl VolumeConfig {
    pub fn from_amounts(amounts: VolumeAmounts) -> Self {
        Self {
            sample: Some(amounts.sample),
            water: Some(amounts.water),
            aliquot: Some(amounts.aliquot),
            stain: Some(amounts.stain),
        }
    }

    pub fn get(&self, field: VolumeField) -> Option<f64> {
        match field {
            VolumeField::Sample => self.sample,
            VolumeField::Water => self.water,
            VolumeField::Aliquot => self.aliquot,
            VolumeField::Stain => self.stain,
        }
    }

    pub fn set(&mut self, field: VolumeField, value: Option<f64>) {
        let slot = match field {
            VolumeField::Sample => &mut self.sample,
            VolumeField::Water => &mut self.water,
            VolumeField::Aliquot => &mut self.aliquot,
            VolumeField::Stain => &mut self.stain,
        };
        *slot = value;
    }

    /// Numeric view with blanks read as zero.
    pub fn amounts(&self) -> VolumeAmounts {
        VolumeAmounts {
            sample: self.sample.unwrap_or(0.0),
            water: self.water.unwrap_or(0.0),
            aliquot: self.aliquot.unwrap_or(0.0),
            stain: self.stain.unwrap_or(0.0),
        }
    }

    /// Both divisors of the dilution formula are set.
    pub fn is_configured(&self) -> bool {
        let amounts = self.amounts();
        amounts.sample > 0.0 && amounts.aliquot > 0.0
    }
}

/// Resolved volumes, as snapshotted into history records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeAmounts {
    pub sample: f64,
    pub water: f64,
    pub aliquot: f64,
    pub stain: f64,
}

/// Names of the editable volume fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum VolumeField {
    Sample,
    Water,
    Aliquot,
    Stain,
}

/// Stock dilution protocols used in the cellar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum VolumePreset {
    /// Vat sample, 1:10 then 1:1 stain.
    Vat,
    /// Fermenter sample, 1:40 then 1:1 stain.
    Fermenter,
}

impl VolumePreset {
    pub fn volumes(self) -> VolumeConfig {
        let water = match self {
            Self::Vat => 9.0,
            Self::Fermenter => 39.0,
        };
        VolumeConfig::from_amounts(VolumeAmounts {
            sample: 1.0,
            water,
            aliquot: 1.0,
            stain: 1.0,
        })
    }
}

/// Serde adapter storing a blank optional number as `""`.
///
/// Reading is lenient: numeric text is accepted, anything unparseable reads
/// as zero. Use on `Option<f64>` fields with `#[serde(with = "...")]`.
pub mod blank_number {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use crate::coercion::to_number;

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(n) => serializer.serialize_f64(*n),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => None,
            Value::String(ref s) if s.trim().is_empty() => None,
            other => Some(to_number(&other, 0.0)),
        })
    }
}
