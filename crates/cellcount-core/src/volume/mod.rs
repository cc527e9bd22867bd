//! Sample preparation volumes and the dilution formula.

pub mod dilution;
pub mod model;

pub use dilution::compute_dilution_factor;
pub use model::{VolumeAmounts, VolumeConfig, VolumeField, VolumePreset, blank_number};
