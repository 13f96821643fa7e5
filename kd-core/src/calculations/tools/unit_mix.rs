//! Daire calculator: unit count and unit-type mix.
//!
//! The saleable area is what remains of the total construction area after
//! common areas are set aside. It is divided by a single unit size, or by
//! the proportion-weighted average size of a mix of unit types.
//!
//! Per-type counts are floored independently, so their sum may fall short
//! of the aggregate count. The shortfall is reported as-is.

use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{
    floor_count, is_percentage, or_zero, percent_to_fraction, round_half_up, safe_div, safe_mul,
    safe_sum, sums_to_hundred,
};
use crate::format::format_number;
use crate::models::{CalculationRecord, FormType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitMixError {
    #[error("Lütfen geçerli bir toplam inşaat alanı girin.")]
    InvalidTotalArea,

    #[error("Ortak alan oranı 0-100 arasında olmalıdır.")]
    CommonAreaRatioOutOfRange,

    #[error("Lütfen geçerli bir daire brüt m² değeri girin.")]
    InvalidUnitSize,

    #[error("Lütfen en az bir daire tipi ekleyin.")]
    NoUnitTypes,

    #[error("Daire tipi oranlarının toplamı %100 olmalıdır.")]
    ProportionsDoNotSumToHundred,

    #[error("'{0}' tipi için geçerli bir brüt m² girin.")]
    InvalidUnitTypeSize(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMixMode {
    #[default]
    Single,
    Mix,
}

/// One apartment type in a mix, e.g. `2+1` at 100 m² making up 50 %.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    #[serde(rename = "brutM2", serialize_with = "float::serialize")]
    pub gross_area: Decimal,
    /// Share of the mix in percent.
    #[serde(rename = "oran", serialize_with = "float::serialize")]
    pub proportion: Decimal,
}

impl UnitType {
    pub fn new(
        name: impl Into<String>,
        gross_area: Decimal,
        proportion: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            gross_area,
            proportion,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMixInput {
    #[serde(rename = "toplamInsaatAlani", default, serialize_with = "float::serialize")]
    pub total_buildable_area: Decimal,

    /// Percentage of the construction area taken by common areas.
    #[serde(rename = "ortakAlanOrani", default, serialize_with = "float::serialize")]
    pub common_area_ratio: Decimal,

    #[serde(default)]
    pub mode: UnitMixMode,

    #[serde(
        rename = "daireBrutM2",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub unit_size: Option<Decimal>,

    #[serde(rename = "tipler", default)]
    pub unit_types: Vec<UnitType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeCount {
    #[serde(rename = "tip")]
    pub name: String,
    #[serde(rename = "adet")]
    pub count: u64,
    #[serde(rename = "brutM2", serialize_with = "float::serialize")]
    pub gross_area: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMixOutput {
    #[serde(rename = "satilabilirBrutAlan", serialize_with = "float::serialize")]
    pub saleable_area: Decimal,

    #[serde(rename = "tahminiDaireAdedi")]
    pub unit_count: u64,

    #[serde(rename = "tipBazliAdetler", default, skip_serializing_if = "Option::is_none")]
    pub per_type: Option<Vec<UnitTypeCount>>,
}

impl UnitMixOutput {
    /// Average saleable area per unit, rounded to whole m².
    ///
    /// `None` when no unit fits.
    pub fn average_unit_area(&self) -> Option<Decimal> {
        safe_div(self.saleable_area, Decimal::from(self.unit_count))
            .map(|avg| round_half_up(avg, 0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitMixCalculator;

impl UnitMixCalculator {
    /// Proportion-weighted average unit size. `None` for an empty or
    /// zero-weight mix.
    fn weighted_average_size(types: &[UnitType]) -> Option<Decimal> {
        let total_proportion = safe_sum(types.iter().map(|t| t.proportion))?;
        let weighted = types.iter().try_fold(Decimal::ZERO, |total, t| {
            total.checked_add(safe_mul(t.gross_area, t.proportion)?)
        })?;
        safe_div(weighted, total_proportion)
    }

    fn mix_counts(
        saleable_area: Decimal,
        types: &[UnitType],
    ) -> (u64, Vec<UnitTypeCount>) {
        let total_proportion = or_zero(safe_sum(types.iter().map(|t| t.proportion)), "total proportion");

        let unit_count = Self::weighted_average_size(types)
            .and_then(|avg| safe_div(saleable_area, avg))
            .map(floor_count)
            .unwrap_or_else(|| {
                tracing::warn!("unit mix has no usable weighted size; reporting zero units");
                0
            });

        let per_type = types
            .iter()
            .map(|t| UnitTypeCount {
                name: t.name.clone(),
                count: safe_mul(Decimal::from(unit_count), t.proportion)
                    .and_then(|share| safe_div(share, total_proportion))
                    .map(floor_count)
                    .unwrap_or(0),
                gross_area: t.gross_area,
            })
            .collect();

        (unit_count, per_type)
    }
}

impl Calculator for UnitMixCalculator {
    const FORM_TYPE: FormType = FormType::UnitMix;

    type Input = UnitMixInput;
    type Output = UnitMixOutput;
    type Error = UnitMixError;

    fn initial_input(&self) -> UnitMixInput {
        UnitMixInput {
            total_buildable_area: Decimal::ZERO,
            common_area_ratio: dec!(25),
            mode: UnitMixMode::Single,
            unit_size: Some(dec!(100)),
            unit_types: vec![
                UnitType::new("2+1", dec!(100), dec!(50)),
                UnitType::new("3+1", dec!(130), dec!(50)),
            ],
        }
    }

    fn validate(
        &self,
        input: &UnitMixInput,
    ) -> Vec<UnitMixError> {
        let mut errors = Vec::new();

        if input.total_buildable_area <= Decimal::ZERO {
            errors.push(UnitMixError::InvalidTotalArea);
        }

        if !is_percentage(input.common_area_ratio) {
            errors.push(UnitMixError::CommonAreaRatioOutOfRange);
        }

        match input.mode {
            UnitMixMode::Single => {
                if input.unit_size.unwrap_or_default() <= Decimal::ZERO {
                    errors.push(UnitMixError::InvalidUnitSize);
                }
            }
            UnitMixMode::Mix => {
                if input.unit_types.is_empty() {
                    errors.push(UnitMixError::NoUnitTypes);
                } else {
                    if !sums_to_hundred(input.unit_types.iter().map(|t| t.proportion)) {
                        errors.push(UnitMixError::ProportionsDoNotSumToHundred);
                    }
                    errors.extend(
                        input
                            .unit_types
                            .iter()
                            .filter(|t| t.gross_area <= Decimal::ZERO)
                            .map(|t| UnitMixError::InvalidUnitTypeSize(t.name.clone())),
                    );
                }
            }
        }

        errors
    }

    fn calculate(
        &self,
        input: &UnitMixInput,
    ) -> CalculationRecord<UnitMixOutput, UnitMixInput> {
        let net_factor = Decimal::ONE - percent_to_fraction(input.common_area_ratio);
        let saleable_area = or_zero(safe_mul(input.total_buildable_area, net_factor), "saleable area");

        let (unit_count, per_type) = match input.mode {
            UnitMixMode::Single => {
                let count = input
                    .unit_size
                    .and_then(|size| safe_div(saleable_area, size))
                    .map(floor_count)
                    .unwrap_or(0);
                (count, None)
            }
            UnitMixMode::Mix if !input.unit_types.is_empty() => {
                let (count, per_type) = Self::mix_counts(saleable_area, &input.unit_types);
                (count, Some(per_type))
            }
            UnitMixMode::Mix => (0, None),
        };

        tracing::debug!(
            saleable = %saleable_area,
            unit_count,
            mode = ?input.mode,
            "unit mix calculated"
        );

        CalculationRecord::new(
            Self::FORM_TYPE,
            UnitMixOutput {
                saleable_area,
                unit_count,
                per_type,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &UnitMixOutput,
    ) -> String {
        format!(
            "Tahmini {} daire, {} m² satılabilir alan",
            output.unit_count,
            format_number(output.saleable_area, 0)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn single(
        total: Decimal,
        common: Decimal,
        size: Decimal,
    ) -> UnitMixInput {
        UnitMixInput {
            total_buildable_area: total,
            common_area_ratio: common,
            mode: UnitMixMode::Single,
            unit_size: Some(size),
            unit_types: Vec::new(),
        }
    }

    fn mix(types: Vec<UnitType>) -> UnitMixInput {
        UnitMixInput {
            total_buildable_area: dec!(2000),
            common_area_ratio: dec!(25),
            mode: UnitMixMode::Mix,
            unit_size: None,
            unit_types: types,
        }
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_accepts_single_mode() {
        assert!(UnitMixCalculator.validate(&single(dec!(2000), dec!(25), dec!(100))).is_empty());
    }

    #[test]
    fn validate_allows_zero_common_area() {
        assert!(UnitMixCalculator.validate(&single(dec!(2000), dec!(0), dec!(100))).is_empty());
    }

    #[test]
    fn validate_rejects_out_of_range_common_area() {
        let errors = UnitMixCalculator.validate(&single(dec!(2000), dec!(101), dec!(100)));

        assert_eq!(errors, vec![UnitMixError::CommonAreaRatioOutOfRange]);
    }

    #[test]
    fn validate_requires_unit_size_in_single_mode() {
        let mut input = single(dec!(0), dec!(25), dec!(100));
        input.unit_size = None;

        let errors = UnitMixCalculator.validate(&input);

        assert_eq!(
            errors,
            vec![UnitMixError::InvalidTotalArea, UnitMixError::InvalidUnitSize]
        );
    }

    #[test]
    fn validate_requires_unit_types_in_mix_mode() {
        let errors = UnitMixCalculator.validate(&mix(Vec::new()));

        assert_eq!(errors, vec![UnitMixError::NoUnitTypes]);
    }

    #[test]
    fn validate_checks_proportion_sum_with_tolerance() {
        let within = mix(vec![
            UnitType::new("2+1", dec!(100), dec!(50.05)),
            UnitType::new("3+1", dec!(130), dec!(50)),
        ]);
        let outside = mix(vec![
            UnitType::new("2+1", dec!(100), dec!(50)),
            UnitType::new("3+1", dec!(130), dec!(40)),
        ]);

        assert!(UnitMixCalculator.validate(&within).is_empty());
        assert_eq!(
            UnitMixCalculator.validate(&outside),
            vec![UnitMixError::ProportionsDoNotSumToHundred]
        );
    }

    #[test]
    fn validate_names_unit_type_without_size() {
        let input = mix(vec![
            UnitType::new("1+1", dec!(0), dec!(30)),
            UnitType::new("2+1", dec!(100), dec!(70)),
        ]);

        assert_eq!(
            UnitMixCalculator.validate(&input),
            vec![UnitMixError::InvalidUnitTypeSize("1+1".to_string())]
        );
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn single_mode_floors_unit_count() {
        let record = UnitMixCalculator.calculate(&single(dec!(2070), dec!(25), dec!(110)));

        // 2070 * 0.75 = 1552.5; / 110 = 14.11
        assert_eq!(record.output.saleable_area, dec!(1552.5));
        assert_eq!(record.output.unit_count, 14);
        assert_eq!(record.output.per_type, None);
    }

    #[test]
    fn mix_mode_uses_weighted_average() {
        let input = mix(vec![
            UnitType::new("2+1", dec!(100), dec!(50)),
            UnitType::new("3+1", dec!(130), dec!(30)),
            UnitType::new("1+1", dec!(65), dec!(20)),
        ]);

        let record = UnitMixCalculator.calculate(&input);

        // saleable 1500; weighted avg = (5000 + 3900 + 1300) / 100 = 102
        assert_eq!(record.output.saleable_area, dec!(1500));
        assert_eq!(record.output.unit_count, 14);
        let counts: Vec<u64> = record
            .output
            .per_type
            .unwrap()
            .iter()
            .map(|t| t.count)
            .collect();
        assert_eq!(counts, vec![7, 4, 2]);
    }

    #[test]
    fn per_type_counts_never_exceed_total() {
        let input = mix(vec![
            UnitType::new("1+1", dec!(60), dec!(33.3)),
            UnitType::new("2+1", dec!(95), dec!(33.3)),
            UnitType::new("3+1", dec!(140), dec!(33.4)),
        ]);

        let record = UnitMixCalculator.calculate(&input);
        let per_type_sum: u64 = record
            .output
            .per_type
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.count)
            .sum();

        assert!(per_type_sum <= record.output.unit_count);
    }

    #[test]
    fn zero_unit_size_yields_zero_units() {
        let record = UnitMixCalculator.calculate(&single(dec!(2000), dec!(25), dec!(0)));

        assert_eq!(record.output.unit_count, 0);
        assert_eq!(record.output.average_unit_area(), None);
    }

    #[test]
    fn average_unit_area_rounds() {
        let record = UnitMixCalculator.calculate(&single(dec!(2070), dec!(25), dec!(110)));

        // 1552.5 / 14 = 110.89
        assert_eq!(record.output.average_unit_area(), Some(dec!(111)));
    }

    #[test]
    fn huge_unit_type_size_reports_zero_units() {
        let data = mix(vec![
            UnitType::new("villa", Decimal::MAX, dec!(50)),
            UnitType::new("2+1", dec!(100), dec!(50)),
        ]);
        assert!(UnitMixCalculator.validate(&data).is_empty());

        let out = UnitMixCalculator.calculate(&data).output;

        assert_eq!(out.saleable_area, dec!(1500));
        assert_eq!(out.unit_count, 0);
        assert!(out.per_type.unwrap().iter().all(|t| t.count == 0));
    }

    #[test]
    fn overflowing_proportions_fail_validation() {
        let data = mix(vec![
            UnitType::new("2+1", dec!(100), Decimal::MAX),
            UnitType::new("3+1", dec!(130), Decimal::MAX),
        ]);

        assert_eq!(
            UnitMixCalculator.validate(&data),
            vec![UnitMixError::ProportionsDoNotSumToHundred]
        );
        assert_eq!(UnitMixCalculator.calculate(&data).output.unit_count, 0);
    }
}
