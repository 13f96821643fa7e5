//! Hand-off mappers between tools.
//!
//! Each mapper copies fields from a source tool's last result into the
//! current tool's inputs and leaves every other field alone.

use rust_decimal::Decimal;

use crate::calculations::{
    AreaRatioCalculator, CostBandInput, RecordOf, RevenueShareInput, UnitMixCalculator,
    UnitMixInput,
};

/// Emsal → daire: the buildable area becomes the unit-mix total area.
pub fn area_ratio_to_unit_mix(
    source: &RecordOf<AreaRatioCalculator>,
    target: &mut UnitMixInput,
) {
    target.total_buildable_area = source.output.total_buildable_area;
}

/// Emsal → maliyet: the buildable area becomes the area to be costed.
pub fn area_ratio_to_cost_band(
    source: &RecordOf<AreaRatioCalculator>,
    target: &mut CostBandInput,
) {
    target.total_buildable_area = source.output.total_buildable_area;
}

/// Daire → paylaşım: unit count, and the average unit area rounded to
/// whole m². The average is left as it was when no unit fits.
pub fn unit_mix_to_revenue_share(
    source: &RecordOf<UnitMixCalculator>,
    target: &mut RevenueShareInput,
) {
    target.unit_count = source.output.unit_count;
    match source.output.average_unit_area() {
        Some(average) if average > Decimal::ZERO => target.average_unit_area = average,
        _ => tracing::warn!("unit mix result has no units; keeping average unit area"),
    }
}
