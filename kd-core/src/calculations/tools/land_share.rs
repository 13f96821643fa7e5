//! Arsa payı calculator: each independent unit's share of the parcel,
//! proportional to its gross area.
//!
//! Shares are rounded independently, so they need not add up to the
//! chosen scale exactly.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use kd_core::calculations::{Calculator, IndependentUnit, LandShareCalculator, LandShareInput};
//!
//! let input = LandShareInput {
//!     units: vec![
//!         IndependentUnit::new("1", dec!(100)),
//!         IndependentUnit::new("2", dec!(300)),
//!     ],
//!     share_scale: dec!(1000),
//! };
//!
//! let out = LandShareCalculator.calculate(&input).output;
//!
//! assert_eq!(out.total_area, dec!(400));
//! assert_eq!(out.shares[0].land_share, dec!(250));
//! assert_eq!(out.shares[1].percentage, dec!(75));
//! ```

use rust_decimal::Decimal;
use rust_decimal::serde::float;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{HUNDRED, or_zero, round_half_up, safe_div, safe_mul, safe_sum};
use crate::format::format_number;
use crate::models::{CalculationRecord, FormType};

/// Share denominator used when none is chosen.
pub const DEFAULT_SHARE_SCALE: Decimal = dec!(10000);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LandShareError {
    #[error("En az bir bağımsız bölüm eklemelisiniz.")]
    NoUnits,

    #[error("Toplam arsa payı ölçeği 0'dan büyük olmalıdır.")]
    InvalidShareScale,
}

/// One flat, shop or other independently registered unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependentUnit {
    pub no: String,
    #[serde(rename = "brutM2", default, serialize_with = "float::serialize")]
    pub gross_area: Decimal,
}

impl IndependentUnit {
    pub fn new(
        no: impl Into<String>,
        gross_area: Decimal,
    ) -> Self {
        Self {
            no: no.into(),
            gross_area,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandShareInput {
    #[serde(rename = "bagimsisBolumler", default)]
    pub units: Vec<IndependentUnit>,

    #[serde(
        rename = "toplamArsaPayiOlcegi",
        default = "default_share_scale",
        serialize_with = "float::serialize"
    )]
    pub share_scale: Decimal,
}

fn default_share_scale() -> Decimal {
    DEFAULT_SHARE_SCALE
}

impl Default for LandShareInput {
    /// Two blank units on a 10 000 scale.
    fn default() -> Self {
        Self {
            units: vec![
                IndependentUnit::new("1", Decimal::ZERO),
                IndependentUnit::new("2", Decimal::ZERO),
            ],
            share_scale: DEFAULT_SHARE_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitShare {
    pub no: String,
    #[serde(rename = "brutM2", serialize_with = "float::serialize")]
    pub gross_area: Decimal,
    /// Numerator over the share scale, rounded half-up.
    #[serde(rename = "arsaPayi", serialize_with = "float::serialize")]
    pub land_share: Decimal,
    #[serde(rename = "oran", serialize_with = "float::serialize")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandShareOutput {
    #[serde(rename = "sonuclar")]
    pub shares: Vec<UnitShare>,
    #[serde(rename = "toplamM2", serialize_with = "float::serialize")]
    pub total_area: Decimal,
    #[serde(rename = "enYuksekOran", serialize_with = "float::serialize")]
    pub highest_percentage: Decimal,
    #[serde(rename = "enDusukOran", serialize_with = "float::serialize")]
    pub lowest_percentage: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LandShareCalculator;

impl LandShareCalculator {
    fn shares(
        units: &[&IndependentUnit],
        total_area: Decimal,
        scale: Decimal,
    ) -> Vec<UnitShare> {
        units
            .iter()
            .map(|unit| {
                let ratio = safe_div(unit.gross_area, total_area).unwrap_or(Decimal::ZERO);
                UnitShare {
                    no: unit.no.clone(),
                    gross_area: unit.gross_area,
                    land_share: round_half_up(or_zero(safe_mul(ratio, scale), "land share"), 0),
                    percentage: or_zero(safe_mul(ratio, HUNDRED), "share percentage"),
                }
            })
            .collect()
    }
}

impl Calculator for LandShareCalculator {
    const FORM_TYPE: FormType = FormType::LandShare;

    type Input = LandShareInput;
    type Output = LandShareOutput;
    type Error = LandShareError;

    fn initial_input(&self) -> LandShareInput {
        LandShareInput::default()
    }

    fn validate(
        &self,
        input: &LandShareInput,
    ) -> Vec<LandShareError> {
        let mut errors = Vec::new();

        if input.units.is_empty() {
            errors.push(LandShareError::NoUnits);
        }
        if input.share_scale <= Decimal::ZERO {
            errors.push(LandShareError::InvalidShareScale);
        }

        errors
    }

    fn calculate(
        &self,
        input: &LandShareInput,
    ) -> CalculationRecord<LandShareOutput, LandShareInput> {
        let units: Vec<&IndependentUnit> = input
            .units
            .iter()
            .filter(|unit| unit.gross_area > Decimal::ZERO)
            .collect();
        let total_area = or_zero(safe_sum(units.iter().map(|unit| unit.gross_area)), "total area");

        if total_area.is_zero() {
            tracing::debug!(units = input.units.len(), "no unit with positive area");
            return CalculationRecord::new(Self::FORM_TYPE, LandShareOutput::default(), input.clone());
        }

        let shares = Self::shares(&units, total_area, input.share_scale);

        let highest_percentage = shares
            .iter()
            .map(|s| s.percentage)
            .max()
            .unwrap_or(Decimal::ZERO);
        let lowest_percentage = shares
            .iter()
            .map(|s| s.percentage)
            .min()
            .unwrap_or(Decimal::ZERO);

        CalculationRecord::new(
            Self::FORM_TYPE,
            LandShareOutput {
                shares,
                total_area,
                highest_percentage,
                lowest_percentage,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &LandShareOutput,
    ) -> String {
        format!(
            "{} bağımsız bölüm, toplam {} m²",
            output.shares.len(),
            format_number(output.total_area, 0)
        )
    }
}
