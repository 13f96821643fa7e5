//! Maliyet calculator: construction cost band.
//!
//! The cost per m² comes from a quality-tier table (or an explicit
//! override), optionally grossed up by 20 % VAT. The band around the
//! realistic figure is a fixed ±10 %.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use kd_core::calculations::{Calculator, CostBandCalculator, CostBandInput, QualityTier};
//!
//! let input = CostBandInput {
//!     total_buildable_area: dec!(1000),
//!     quality: Some(QualityTier::Mid),
//!     vat_included: true,
//!     unit_cost_override: None,
//! };
//!
//! let record = CostBandCalculator::default().calculate(&input);
//!
//! assert_eq!(record.output.unit_cost, dec!(39000));
//! assert_eq!(record.output.mid, dec!(39000000));
//! assert_eq!(record.output.low, dec!(35100000));
//! assert_eq!(record.output.high, dec!(42900000));
//! ```

use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{or_zero, safe_mul};
use crate::format::format_number;
use crate::models::{CalculationRecord, FormType};

/// Multiplier applied when the VAT-inclusive flag is set.
pub const VAT_FACTOR: Decimal = dec!(1.20);

/// Multiplier for the optimistic end of the band.
pub const LOW_BAND_FACTOR: Decimal = dec!(0.90);

/// Multiplier for the pessimistic end of the band.
pub const HIGH_BAND_FACTOR: Decimal = dec!(1.10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CostBandError {
    #[error("Lütfen geçerli bir toplam inşaat alanı girin.")]
    InvalidTotalArea,

    #[error("Lütfen bir kalite seviyesi seçin.")]
    MissingQuality,

    #[error("m² maliyeti negatif olamaz.")]
    NegativeUnitCost,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "ekonomik")]
    Economy,
    #[default]
    #[serde(rename = "orta")]
    Mid,
    #[serde(rename = "ust")]
    Premium,
}

impl QualityTier {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ekonomik" => Some(Self::Economy),
            "orta" => Some(Self::Mid),
            "ust" => Some(Self::Premium),
            _ => None,
        }
    }
}

/// Base construction cost per m² for each quality tier, in TL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTiers {
    pub economy: Decimal,
    pub mid: Decimal,
    pub premium: Decimal,
}

impl CostTiers {
    pub fn cost_for(
        &self,
        tier: QualityTier,
    ) -> Decimal {
        match tier {
            QualityTier::Economy => self.economy,
            QualityTier::Mid => self.mid,
            QualityTier::Premium => self.premium,
        }
    }
}

impl Default for CostTiers {
    /// 2024/2025 Ankara averages.
    fn default() -> Self {
        Self {
            economy: dec!(22500),
            mid: dec!(32500),
            premium: dec!(47500),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBandInput {
    #[serde(rename = "toplamInsaatAlani", default, serialize_with = "float::serialize")]
    pub total_buildable_area: Decimal,

    #[serde(rename = "kalite", default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityTier>,

    #[serde(rename = "kdvDahil", default)]
    pub vat_included: bool,

    /// Replaces the tier cost when positive.
    #[serde(
        rename = "m2Maliyet",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub unit_cost_override: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBandOutput {
    #[serde(rename = "dusukSenaryo", serialize_with = "float::serialize")]
    pub low: Decimal,
    #[serde(rename = "ortaSenaryo", serialize_with = "float::serialize")]
    pub mid: Decimal,
    #[serde(rename = "yuksekSenaryo", serialize_with = "float::serialize")]
    pub high: Decimal,
    /// Cost per m² actually used, VAT applied if requested.
    #[serde(rename = "m2Maliyet", serialize_with = "float::serialize")]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CostBandCalculator {
    tiers: CostTiers,
}

impl CostBandCalculator {
    pub fn new(tiers: CostTiers) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &CostTiers {
        &self.tiers
    }

    fn unit_cost(
        &self,
        input: &CostBandInput,
    ) -> Decimal {
        let base = input
            .unit_cost_override
            .filter(|cost| *cost > Decimal::ZERO)
            .unwrap_or_else(|| self.tiers.cost_for(input.quality.unwrap_or_default()));

        if input.vat_included {
            or_zero(safe_mul(base, VAT_FACTOR), "unit cost")
        } else {
            base
        }
    }
}

impl Calculator for CostBandCalculator {
    const FORM_TYPE: FormType = FormType::CostBand;

    type Input = CostBandInput;
    type Output = CostBandOutput;
    type Error = CostBandError;

    fn initial_input(&self) -> CostBandInput {
        CostBandInput {
            total_buildable_area: Decimal::ZERO,
            quality: Some(QualityTier::Mid),
            vat_included: true,
            unit_cost_override: None,
        }
    }

    fn validate(
        &self,
        input: &CostBandInput,
    ) -> Vec<CostBandError> {
        let mut errors = Vec::new();

        if input.total_buildable_area <= Decimal::ZERO {
            errors.push(CostBandError::InvalidTotalArea);
        }
        if input.quality.is_none() {
            errors.push(CostBandError::MissingQuality);
        }
        if input.unit_cost_override.is_some_and(|cost| cost < Decimal::ZERO) {
            errors.push(CostBandError::NegativeUnitCost);
        }

        errors
    }

    fn calculate(
        &self,
        input: &CostBandInput,
    ) -> CalculationRecord<CostBandOutput, CostBandInput> {
        let unit_cost = self.unit_cost(input);
        let mid = or_zero(safe_mul(input.total_buildable_area, unit_cost), "mid cost");

        let output = CostBandOutput {
            low: or_zero(safe_mul(mid, LOW_BAND_FACTOR), "low cost"),
            mid,
            high: or_zero(safe_mul(mid, HIGH_BAND_FACTOR), "high cost"),
            unit_cost,
        };

        tracing::debug!(unit_cost = %unit_cost, mid = %mid, "cost band calculated");

        CalculationRecord::new(Self::FORM_TYPE, output, input.clone())
    }

    fn summary(
        &self,
        output: &CostBandOutput,
    ) -> String {
        format!(
            "Maliyet: {} - {} TL",
            format_number(output.low, 0),
            format_number(output.high, 0)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn input(
        area: Decimal,
        quality: QualityTier,
        vat: bool,
    ) -> CostBandInput {
        CostBandInput {
            total_buildable_area: area,
            quality: Some(quality),
            vat_included: vat,
            unit_cost_override: None,
        }
    }

    #[test]
    fn validate_requires_area_and_quality() {
        let errors = CostBandCalculator::default().validate(&CostBandInput::default());

        assert_eq!(
            errors,
            vec![CostBandError::InvalidTotalArea, CostBandError::MissingQuality]
        );
    }

    #[test]
    fn validate_rejects_negative_override() {
        let mut data = input(dec!(1000), QualityTier::Mid, false);
        data.unit_cost_override = Some(dec!(-5));

        assert_eq!(
            CostBandCalculator::default().validate(&data),
            vec![CostBandError::NegativeUnitCost]
        );
    }

    #[test]
    fn mid_tier_with_vat_matches_reference_figures() {
        let record = CostBandCalculator::default().calculate(&input(dec!(1000), QualityTier::Mid, true));

        assert_eq!(record.output.unit_cost, dec!(39000));
        assert_eq!(record.output.mid, dec!(39000000));
        assert_eq!(record.output.low, dec!(35100000));
        assert_eq!(record.output.high, dec!(42900000));
    }

    #[test]
    fn tier_cost_used_without_vat() {
        let record =
            CostBandCalculator::default().calculate(&input(dec!(200), QualityTier::Economy, false));

        assert_eq!(record.output.unit_cost, dec!(22500));
        assert_eq!(record.output.mid, dec!(4500000));
    }

    #[test]
    fn positive_override_replaces_tier_cost() {
        let mut data = input(dec!(100), QualityTier::Premium, true);
        data.unit_cost_override = Some(dec!(40000));

        let record = CostBandCalculator::default().calculate(&data);

        assert_eq!(record.output.unit_cost, dec!(48000));
    }

    #[test]
    fn zero_override_falls_back_to_tier() {
        let mut data = input(dec!(100), QualityTier::Premium, false);
        data.unit_cost_override = Some(dec!(0));

        let record = CostBandCalculator::default().calculate(&data);

        assert_eq!(record.output.unit_cost, dec!(47500));
    }

    #[test]
    fn custom_tiers_are_honoured() {
        let calculator = CostBandCalculator::new(CostTiers {
            economy: dec!(20000),
            mid: dec!(30000),
            premium: dec!(45000),
        });

        let record = calculator.calculate(&input(dec!(10), QualityTier::Mid, false));

        assert_eq!(record.output.mid, dec!(300000));
    }

    #[test]
    fn summary_prints_band() {
        let calculator = CostBandCalculator::default();
        let record = calculator.calculate(&input(dec!(1000), QualityTier::Mid, true));

        assert_eq!(
            calculator.summary(&record.output),
            "Maliyet: 35.100.000 - 42.900.000 TL"
        );
    }

    #[test]
    fn huge_area_reports_zero_band() {
        let data = input(Decimal::MAX, QualityTier::Mid, true);
        assert!(CostBandCalculator::default().validate(&data).is_empty());

        let out = CostBandCalculator::default().calculate(&data).output;

        assert_eq!(out.unit_cost, dec!(39000));
        assert_eq!((out.low, out.mid, out.high), (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
    }

    #[test]
    fn huge_override_with_vat_reports_zero_unit_cost() {
        let mut data = input(dec!(1000), QualityTier::Mid, true);
        data.unit_cost_override = Some(Decimal::MAX);

        let out = CostBandCalculator::default().calculate(&data).output;

        assert_eq!(out.unit_cost, Decimal::ZERO);
        assert_eq!(out.mid, Decimal::ZERO);
    }
}
