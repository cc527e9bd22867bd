//! Dilution factor of the two-stage sample preparation.

use super::model::VolumeConfig;

/// Total dilution applied before the sample reached the chamber.
///
/// Stage one dilutes the raw sample with water, stage two mixes an aliquot
/// with stain; the two factors multiply. Returns `1.0` (no dilution) while
/// `sample` or `aliquot` is zero or blank. No rounding happens here.
pub fn compute_dilution_factor(volumes: &VolumeConfig) -> f64 {
    let v = volumes.amounts();
    if v.sample == 0.0 || v.aliquot == 0.0 {
        return 1.0;
    }

    let df1 = (v.sample + v.water) / v.sample;
    let df2 = (v.aliquot + v.stain) / v.aliquot;
    df1 * df2
}
