//! Emsal (TAKS-KAKS) calculator.
//!
//! Converts a land parcel's area into its permitted construction area using
//! the floor-area ratio (KAKS), and, when a base coverage ratio (TAKS) is
//! known, the ground-floor footprint and a rough floor count.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use kd_core::calculations::{AreaRatioCalculator, AreaRatioInput, Calculator};
//!
//! let input = AreaRatioInput {
//!     land_area: dec!(1000),
//!     floor_area_ratio: Some(dec!(2.07)),
//!     base_coverage_ratio: Some(dec!(0.30)),
//!     ..Default::default()
//! };
//!
//! let record = AreaRatioCalculator.calculate(&input);
//!
//! assert_eq!(record.output.total_buildable_area, dec!(2070));
//! assert_eq!(record.output.footprint, Some(dec!(300)));
//! assert_eq!(record.output.estimated_floors, Some(6));
//! ```

use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{floor_count, or_zero, safe_div, safe_mul};
use crate::format::format_number;
use crate::models::{CalculationRecord, FormType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AreaRatioError {
    #[error("Lütfen geçerli bir arsa alanı girin.")]
    InvalidLandArea,

    #[error("Lütfen geçerli bir KAKS/Emsal değeri girin.")]
    InvalidFloorAreaRatio,

    #[error("TAKS değeri negatif olamaz.")]
    NegativeBaseCoverageRatio,

    #[error("TAKS değeri 1'den büyük olamaz.")]
    BaseCoverageRatioAboveOne,

    #[error("KAKS değeri TAKS değerinden küçük olamaz.")]
    FloorAreaRatioBelowBaseCoverage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRatioInput {
    #[serde(rename = "il", default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(rename = "ilce", default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(rename = "mahalle", default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    /// Parcel area in m².
    #[serde(rename = "arsaAlani", default, serialize_with = "float::serialize")]
    pub land_area: Decimal,

    /// Floor-area ratio (KAKS / emsal).
    #[serde(
        rename = "kaks",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub floor_area_ratio: Option<Decimal>,

    /// Base coverage ratio (TAKS), a fraction of the parcel.
    #[serde(
        rename = "taks",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub base_coverage_ratio: Option<Decimal>,

    /// Storey height in metres; informational only.
    #[serde(
        rename = "katYuksekligi",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub floor_height: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRatioOutput {
    #[serde(rename = "toplamInsaatAlani", serialize_with = "float::serialize")]
    pub total_buildable_area: Decimal,

    #[serde(
        rename = "tabanOturumu",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub footprint: Option<Decimal>,

    /// Only present when the footprint is positive.
    #[serde(rename = "tahminiKatSayisi", default, skip_serializing_if = "Option::is_none")]
    pub estimated_floors: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AreaRatioCalculator;

impl Calculator for AreaRatioCalculator {
    const FORM_TYPE: FormType = FormType::AreaRatio;

    type Input = AreaRatioInput;
    type Output = AreaRatioOutput;
    type Error = AreaRatioError;

    fn initial_input(&self) -> AreaRatioInput {
        AreaRatioInput {
            floor_height: Some(dec!(3)),
            ..Default::default()
        }
    }

    fn validate(
        &self,
        input: &AreaRatioInput,
    ) -> Vec<AreaRatioError> {
        let mut errors = Vec::new();

        if input.land_area <= Decimal::ZERO {
            errors.push(AreaRatioError::InvalidLandArea);
        }

        let kaks = input.floor_area_ratio.unwrap_or_default();
        if kaks <= Decimal::ZERO {
            errors.push(AreaRatioError::InvalidFloorAreaRatio);
        }

        if let Some(taks) = input.base_coverage_ratio {
            if taks < Decimal::ZERO {
                errors.push(AreaRatioError::NegativeBaseCoverageRatio);
            } else if taks > Decimal::ONE {
                errors.push(AreaRatioError::BaseCoverageRatioAboveOne);
            }

            if kaks > Decimal::ZERO && taks > Decimal::ZERO && kaks < taks {
                errors.push(AreaRatioError::FloorAreaRatioBelowBaseCoverage);
            }
        }

        errors
    }

    fn calculate(
        &self,
        input: &AreaRatioInput,
    ) -> CalculationRecord<AreaRatioOutput, AreaRatioInput> {
        let total_buildable_area = match input.floor_area_ratio {
            Some(kaks) if !kaks.is_zero() => {
                or_zero(safe_mul(input.land_area, kaks), "total buildable area")
            }
            _ => Decimal::ZERO,
        };

        let footprint = input
            .base_coverage_ratio
            .filter(|taks| !taks.is_zero())
            .map(|taks| or_zero(safe_mul(input.land_area, taks), "footprint"));

        let estimated_floors = footprint
            .filter(|area| *area > Decimal::ZERO)
            .and_then(|area| safe_div(total_buildable_area, area))
            .map(floor_count);

        tracing::debug!(
            land_area = %input.land_area,
            total = %total_buildable_area,
            ?estimated_floors,
            "area ratio calculated"
        );

        CalculationRecord::new(
            Self::FORM_TYPE,
            AreaRatioOutput {
                total_buildable_area,
                footprint,
                estimated_floors,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &AreaRatioOutput,
    ) -> String {
        let floors = output
            .estimated_floors
            .map(|n| format!(", ~{n} kat"))
            .unwrap_or_default();
        format!(
            "Toplam İnşaat: {} m²{floors}",
            format_number(output.total_buildable_area, 0)
        )
    }
}
