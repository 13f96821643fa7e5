//! Paylaşım calculator: kat karşılığı split between land owners and the
//! contractor.
//!
//! The owner share percentage is a parameter of the calculator rather than
//! of the input record; the UI offers 45 / 40 / 35 % presets. Owner units
//! are floored and the contractor takes the remainder, so the two always
//! add up to the total exactly.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use kd_core::calculations::{Calculator, RevenueShareCalculator, RevenueShareInput};
//!
//! let input = RevenueShareInput {
//!     unit_count: 10,
//!     average_unit_area: dec!(100),
//!     price_per_area: dec!(50000),
//!     land_value: Some(dec!(1000000)),
//!     ..Default::default()
//! };
//!
//! let record = RevenueShareCalculator::default().calculate(&input);
//!
//! assert_eq!(record.output.total_revenue, dec!(50000000));
//! assert_eq!(record.output.owner_unit_count, 4);
//! assert_eq!(record.output.owner_share_value, dec!(20000000));
//! assert_eq!(record.output.owner_cash_support, dec!(0));
//! ```

use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{
    HUNDRED, floor_count, is_percentage, or_zero, percent_to_fraction, round_half_up, safe_mul,
    safe_sum,
};
use crate::models::{CalculationRecord, FormType, Scenario};

/// Owner share used when none is chosen.
pub const DEFAULT_OWNER_SHARE_PERCENT: Decimal = dec!(40);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevenueShareError {
    #[error("Lütfen geçerli bir daire adedi girin.")]
    InvalidUnitCount,

    #[error("Lütfen geçerli bir ortalama daire m² girin.")]
    InvalidAverageUnitArea,

    #[error("Lütfen geçerli bir m² satış fiyatı girin.")]
    InvalidPricePerArea,

    #[error("Ek maliyetler negatif olamaz.")]
    NegativeAdditionalCost,

    #[error("Malik payı 0-100 arasında olmalıdır.")]
    OwnerShareOutOfRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueShareInput {
    #[serde(rename = "toplamDaireAdedi", default)]
    pub unit_count: u64,

    #[serde(rename = "ortalamaDaireM2", default, serialize_with = "float::serialize")]
    pub average_unit_area: Decimal,

    /// Sale price per m², TL.
    #[serde(rename = "m2Fiyat", default, serialize_with = "float::serialize")]
    pub price_per_area: Decimal,

    #[serde(
        rename = "arsaDegeri",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub land_value: Option<Decimal>,
    #[serde(
        rename = "yikim",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub demolition_cost: Option<Decimal>,
    #[serde(
        rename = "geciciKonut",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub temporary_housing_cost: Option<Decimal>,
    #[serde(
        rename = "diger",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub other_costs: Option<Decimal>,
}

impl RevenueShareInput {
    fn additional_costs(&self) -> [Option<Decimal>; 4] {
        [
            self.land_value,
            self.demolition_cost,
            self.temporary_housing_cost,
            self.other_costs,
        ]
    }

    pub fn total_additional_costs(&self) -> Decimal {
        or_zero(safe_sum(self.additional_costs().into_iter().flatten()), "additional costs")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueShareOutput {
    #[serde(rename = "toplamHasilat", serialize_with = "float::serialize")]
    pub total_revenue: Decimal,
    #[serde(rename = "toplamMaliyetler", serialize_with = "float::serialize")]
    pub total_additional_costs: Decimal,
    #[serde(rename = "malikPayOrani", serialize_with = "float::serialize")]
    pub owner_share_percent: Decimal,
    #[serde(rename = "muteahhitPayOrani", serialize_with = "float::serialize")]
    pub contractor_share_percent: Decimal,
    #[serde(rename = "malikDaireAdedi")]
    pub owner_unit_count: u64,
    #[serde(rename = "muteahhitDaireAdedi")]
    pub contractor_unit_count: u64,
    #[serde(rename = "malikPayDegeri", serialize_with = "float::serialize")]
    pub owner_share_value: Decimal,
    #[serde(rename = "muteahhitPayDegeri", serialize_with = "float::serialize")]
    pub contractor_share_value: Decimal,
    /// Cash the owners must contribute when their share cannot absorb the
    /// additional costs.
    #[serde(rename = "malikNakitDestegi", serialize_with = "float::serialize")]
    pub owner_cash_support: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct RevenueShareCalculator {
    owner_share_percent: Decimal,
}

impl RevenueShareCalculator {
    pub fn new(owner_share_percent: Decimal) -> Self {
        Self {
            owner_share_percent,
        }
    }

    /// Preset owner shares: optimistic 45 %, realistic 40 %, conservative 35 %.
    pub fn for_scenario(scenario: Scenario) -> Self {
        let percent = match scenario {
            Scenario::Optimistic => dec!(45),
            Scenario::Realistic => DEFAULT_OWNER_SHARE_PERCENT,
            Scenario::Conservative => dec!(35),
        };
        Self::new(percent)
    }

    pub fn owner_share_percent(&self) -> Decimal {
        self.owner_share_percent
    }
}

impl Default for RevenueShareCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER_SHARE_PERCENT)
    }
}

impl Calculator for RevenueShareCalculator {
    const FORM_TYPE: FormType = FormType::RevenueShare;

    type Input = RevenueShareInput;
    type Output = RevenueShareOutput;
    type Error = RevenueShareError;

    fn initial_input(&self) -> RevenueShareInput {
        RevenueShareInput {
            unit_count: 0,
            average_unit_area: dec!(100),
            price_per_area: dec!(50000),
            land_value: Some(Decimal::ZERO),
            demolition_cost: Some(dec!(500000)),
            temporary_housing_cost: Some(dec!(300000)),
            other_costs: Some(Decimal::ZERO),
        }
    }

    fn validate(
        &self,
        input: &RevenueShareInput,
    ) -> Vec<RevenueShareError> {
        let mut errors = Vec::new();

        if input.unit_count == 0 {
            errors.push(RevenueShareError::InvalidUnitCount);
        }
        if input.average_unit_area <= Decimal::ZERO {
            errors.push(RevenueShareError::InvalidAverageUnitArea);
        }
        if input.price_per_area <= Decimal::ZERO {
            errors.push(RevenueShareError::InvalidPricePerArea);
        }
        if input
            .additional_costs()
            .into_iter()
            .flatten()
            .any(|cost| cost < Decimal::ZERO)
        {
            errors.push(RevenueShareError::NegativeAdditionalCost);
        }
        if !is_percentage(self.owner_share_percent) {
            errors.push(RevenueShareError::OwnerShareOutOfRange);
        }

        errors
    }

    fn calculate(
        &self,
        input: &RevenueShareInput,
    ) -> CalculationRecord<RevenueShareOutput, RevenueShareInput> {
        let unit_value = or_zero(safe_mul(input.average_unit_area, input.price_per_area), "unit value");
        let total_units = Decimal::from(input.unit_count);

        let total_revenue = or_zero(safe_mul(total_units, unit_value), "total revenue");
        let total_additional_costs = input.total_additional_costs();

        let owner_units = safe_mul(total_units, percent_to_fraction(self.owner_share_percent));
        let owner_unit_count = floor_count(or_zero(owner_units, "owner units")).min(input.unit_count);
        let contractor_unit_count = input.unit_count - owner_unit_count;

        let owner_share_value = or_zero(
            safe_mul(Decimal::from(owner_unit_count), unit_value),
            "owner share value",
        );
        let contractor_share_value = or_zero(
            safe_mul(Decimal::from(contractor_unit_count), unit_value),
            "contractor share value",
        );

        let owner_cash_support = or_zero(
            total_additional_costs.checked_sub(owner_share_value),
            "owner cash support",
        )
        .max(Decimal::ZERO);

        tracing::debug!(
            owner_units = owner_unit_count,
            contractor_units = contractor_unit_count,
            cash_support = %owner_cash_support,
            "revenue share calculated"
        );

        CalculationRecord::new(
            Self::FORM_TYPE,
            RevenueShareOutput {
                total_revenue,
                total_additional_costs,
                owner_share_percent: self.owner_share_percent,
                contractor_share_percent: or_zero(
                    HUNDRED.checked_sub(self.owner_share_percent),
                    "contractor share",
                ),
                owner_unit_count,
                contractor_unit_count,
                owner_share_value,
                contractor_share_value,
                owner_cash_support,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &RevenueShareOutput,
    ) -> String {
        format!(
            "Malik Payı: %{:.1}, Müteahhit Payı: %{:.1}",
            round_half_up(output.owner_share_percent, 1),
            round_half_up(output.contractor_share_percent, 1)
        )
    }
}
