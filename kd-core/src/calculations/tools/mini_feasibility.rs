//! Müteahhit mini fizibilite: a contractor's first look at a parcel.
//!
//! Sellable area is taken to be the area the floor-area ratio yields; the
//! common-area percentage only grosses up the area that has to be built and
//! paid for. The owner/contractor split is a rough placeholder derived from
//! the target profit, not an allocation model.

use rust_decimal::Decimal;
use rust_decimal::serde::float;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{
    HUNDRED, is_percentage, or_zero, percent_to_fraction, safe_div, safe_mul,
};
use crate::format::{format_currency, format_percentage};
use crate::models::{CalculationRecord, FormType};

/// Target profit assumed by the share heuristic when none is given.
pub const FALLBACK_TARGET_PROFIT: Decimal = dec!(25);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MiniFeasibilityError {
    #[error("Arsa alanı 0'dan büyük olmalıdır.")]
    InvalidLandArea,

    #[error("Emsal 0'dan büyük olmalıdır.")]
    InvalidFloorAreaRatio,

    #[error("Ortak alan oranı 0-100 arasında olmalıdır.")]
    CommonAreaRatioOutOfRange,

    #[error("Satış fiyatı 0'dan büyük olmalıdır.")]
    InvalidSalePrice,

    #[error("İnşaat maliyeti 0'dan büyük olmalıdır.")]
    InvalidUnitCost,

    #[error("Hedef kâr 0-100 arasında olmalıdır.")]
    TargetProfitOutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniFeasibilityInput {
    #[serde(rename = "arsaAlani", default, serialize_with = "float::serialize")]
    pub land_area: Decimal,

    #[serde(rename = "emsal", default, serialize_with = "float::serialize")]
    pub floor_area_ratio: Decimal,

    #[serde(rename = "ortakAlanOrani", default, serialize_with = "float::serialize")]
    pub common_area_percent: Decimal,

    /// TL per m² of sellable area.
    #[serde(rename = "satisFiyati", default, serialize_with = "float::serialize")]
    pub sale_price: Decimal,

    /// TL per m² of construction.
    #[serde(rename = "maliyet", default, serialize_with = "float::serialize")]
    pub unit_cost: Decimal,

    #[serde(rename = "hedefKar", default, serialize_with = "float::serialize")]
    pub target_profit_percent: Decimal,
}

impl Default for MiniFeasibilityInput {
    fn default() -> Self {
        Self {
            land_area: Decimal::ZERO,
            floor_area_ratio: dec!(1.5),
            common_area_percent: dec!(25),
            sale_price: Decimal::ZERO,
            unit_cost: dec!(35000),
            target_profit_percent: dec!(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniFeasibilityOutput {
    #[serde(rename = "toplamInsaatAlani", serialize_with = "float::serialize")]
    pub total_buildable_area: Decimal,
    #[serde(rename = "satilabilirBrutAlan", serialize_with = "float::serialize")]
    pub saleable_area: Decimal,
    #[serde(rename = "toplamCiro", serialize_with = "float::serialize")]
    pub total_revenue: Decimal,
    #[serde(rename = "toplamMaliyet", serialize_with = "float::serialize")]
    pub total_cost: Decimal,
    #[serde(rename = "kar", serialize_with = "float::serialize")]
    pub profit: Decimal,
    #[serde(rename = "hedefKar", serialize_with = "float::serialize")]
    pub target_profit_percent: Decimal,
    /// Profit over cost, percent. Zero when there is no cost.
    #[serde(rename = "karMarji", serialize_with = "float::serialize")]
    pub profit_margin: Decimal,
    #[serde(rename = "malikPayOrani", serialize_with = "float::serialize")]
    pub owner_share_percent: Decimal,
    #[serde(rename = "muteahhitPayOrani", serialize_with = "float::serialize")]
    pub contractor_share_percent: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MiniFeasibilityCalculator;

impl Calculator for MiniFeasibilityCalculator {
    const FORM_TYPE: FormType = FormType::MiniFeasibility;

    type Input = MiniFeasibilityInput;
    type Output = MiniFeasibilityOutput;
    type Error = MiniFeasibilityError;

    fn initial_input(&self) -> MiniFeasibilityInput {
        MiniFeasibilityInput::default()
    }

    fn validate(
        &self,
        input: &MiniFeasibilityInput,
    ) -> Vec<MiniFeasibilityError> {
        let mut errors = Vec::new();

        if input.land_area <= Decimal::ZERO {
            errors.push(MiniFeasibilityError::InvalidLandArea);
        }
        if input.floor_area_ratio <= Decimal::ZERO {
            errors.push(MiniFeasibilityError::InvalidFloorAreaRatio);
        }
        if !is_percentage(input.common_area_percent) {
            errors.push(MiniFeasibilityError::CommonAreaRatioOutOfRange);
        }
        if input.sale_price <= Decimal::ZERO {
            errors.push(MiniFeasibilityError::InvalidSalePrice);
        }
        if input.unit_cost <= Decimal::ZERO {
            errors.push(MiniFeasibilityError::InvalidUnitCost);
        }
        if !is_percentage(input.target_profit_percent) {
            errors.push(MiniFeasibilityError::TargetProfitOutOfRange);
        }

        errors
    }

    fn calculate(
        &self,
        input: &MiniFeasibilityInput,
    ) -> CalculationRecord<MiniFeasibilityOutput, MiniFeasibilityInput> {
        let net_area = or_zero(safe_mul(input.land_area, input.floor_area_ratio), "net area");
        let gross_factor = Decimal::ONE + percent_to_fraction(input.common_area_percent);
        let total_buildable_area = or_zero(safe_mul(net_area, gross_factor), "total buildable area");
        let saleable_area = net_area;

        let total_cost = or_zero(safe_mul(total_buildable_area, input.unit_cost), "total cost");
        let total_revenue = or_zero(safe_mul(saleable_area, input.sale_price), "total revenue");
        let profit = or_zero(total_revenue.checked_sub(total_cost), "profit");

        let profit_margin = if total_cost > Decimal::ZERO {
            or_zero(
                safe_div(profit, total_cost).and_then(|ratio| safe_mul(ratio, HUNDRED)),
                "profit margin",
            )
        } else {
            Decimal::ZERO
        };

        let heuristic_profit = if input.target_profit_percent.is_zero() {
            FALLBACK_TARGET_PROFIT
        } else {
            input.target_profit_percent
        };
        let contractor_share_percent = HUNDRED - heuristic_profit;
        let owner_share_percent = HUNDRED - contractor_share_percent;

        if profit < Decimal::ZERO {
            tracing::debug!(profit = %profit, "mini feasibility shows a loss");
        }

        CalculationRecord::new(
            Self::FORM_TYPE,
            MiniFeasibilityOutput {
                total_buildable_area,
                saleable_area,
                total_revenue,
                total_cost,
                profit,
                target_profit_percent: input.target_profit_percent,
                profit_margin,
                owner_share_percent,
                contractor_share_percent,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &MiniFeasibilityOutput,
    ) -> String {
        format!(
            "Kâr: {}, Kâr Marjı: {}",
            format_currency(output.profit),
            format_percentage(output.profit_margin, 1)
        )
    }
}
