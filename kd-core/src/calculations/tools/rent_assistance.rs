//! Destek calculator: rent assistance paid to residents of a building
//! under urban transformation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::serde::{float, float_option};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::calculations::common::{or_zero, safe_mul};
use crate::format::format_currency;
use crate::models::{CalculationRecord, FormType};

/// Rate table key used when a city has no entry of its own.
pub const FALLBACK_CITY: &str = "diger";

/// Month count pre-filled for a new session.
pub const DEFAULT_MONTHS: u64 = 18;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RentAssistanceError {
    #[error("Lütfen bir il seçin.")]
    MissingCity,

    #[error("Lütfen statünüzü seçin (Malik/Kiracı).")]
    MissingStatus,

    #[error("Lütfen geçerli bir ay sayısı girin.")]
    InvalidMonthCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidentStatus {
    #[serde(rename = "malik")]
    Owner,
    #[serde(rename = "kiraci")]
    Tenant,
    #[serde(rename = "sinirli-ayni-hak")]
    LimitedRealRight,
}

impl ResidentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "malik" => Some(Self::Owner),
            "kiraci" => Some(Self::Tenant),
            "sinirli-ayni-hak" => Some(Self::LimitedRealRight),
            _ => None,
        }
    }
}

/// Monthly rent support per city, TL.
///
/// Keys are normalised city names (see [`RentSupportRates::normalise_city`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentSupportRates(BTreeMap<String, Decimal>);

impl RentSupportRates {
    pub fn new(rates: BTreeMap<String, Decimal>) -> Self {
        Self(
            rates
                .into_iter()
                .map(|(city, rate)| (Self::normalise_city(&city), rate))
                .collect(),
        )
    }

    /// Lower-cases and trims a city name. The dotted capital `İ` maps to a
    /// plain `i` so that "İstanbul" and "istanbul" share a key.
    pub fn normalise_city(city: &str) -> String {
        city.trim().replace('İ', "i").to_lowercase()
    }

    /// Rate for `city`, falling back to the `diger` entry, then to zero.
    pub fn rate_for(
        &self,
        city: &str,
    ) -> Decimal {
        let key = Self::normalise_city(city);
        self.0
            .get(&key)
            .or_else(|| self.0.get(FALLBACK_CITY))
            .copied()
            .unwrap_or_else(|| {
                tracing::warn!(city = %key, "no rent support rate and no fallback entry");
                Decimal::ZERO
            })
    }
}

impl Default for RentSupportRates {
    fn default() -> Self {
        Self(BTreeMap::from([
            ("istanbul".to_string(), dec!(5500)),
            ("ankara".to_string(), dec!(4500)),
            ("izmir".to_string(), dec!(4500)),
            ("antalya".to_string(), dec!(3750)),
            ("bursa".to_string(), dec!(3750)),
            (FALLBACK_CITY.to_string(), dec!(3000)),
        ]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentAssistanceInput {
    #[serde(rename = "il", default)]
    pub city: String,

    #[serde(rename = "statu", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResidentStatus>,

    #[serde(rename = "aySayisi", default)]
    pub months: u64,

    /// Filled in by the calculator with the monthly rate it applied.
    #[serde(
        rename = "aylikTahminiDestek",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "float_option::serialize"
    )]
    pub estimated_monthly_support: Option<Decimal>,
}

impl Default for RentAssistanceInput {
    fn default() -> Self {
        Self {
            city: String::new(),
            status: None,
            months: DEFAULT_MONTHS,
            estimated_monthly_support: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentAssistanceOutput {
    #[serde(rename = "aylikDestek", serialize_with = "float::serialize")]
    pub monthly_support: Decimal,
    #[serde(rename = "toplamDestek", serialize_with = "float::serialize")]
    pub total_support: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct RentAssistanceCalculator {
    rates: RentSupportRates,
}

impl RentAssistanceCalculator {
    pub fn new(rates: RentSupportRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RentSupportRates {
        &self.rates
    }
}

impl Calculator for RentAssistanceCalculator {
    const FORM_TYPE: FormType = FormType::RentAssistance;

    type Input = RentAssistanceInput;
    type Output = RentAssistanceOutput;
    type Error = RentAssistanceError;

    fn initial_input(&self) -> RentAssistanceInput {
        RentAssistanceInput {
            city: "ankara".to_string(),
            status: Some(ResidentStatus::Owner),
            ..Default::default()
        }
    }

    fn validate(
        &self,
        input: &RentAssistanceInput,
    ) -> Vec<RentAssistanceError> {
        let mut errors = Vec::new();

        if input.city.trim().is_empty() {
            errors.push(RentAssistanceError::MissingCity);
        }
        if input.status.is_none() {
            errors.push(RentAssistanceError::MissingStatus);
        }
        if input.months == 0 {
            errors.push(RentAssistanceError::InvalidMonthCount);
        }

        errors
    }

    fn calculate(
        &self,
        input: &RentAssistanceInput,
    ) -> CalculationRecord<RentAssistanceOutput, RentAssistanceInput> {
        let monthly_support = self.rates.rate_for(&input.city);
        let total_support = or_zero(safe_mul(monthly_support, Decimal::from(input.months)), "total support");

        let mut inputs = input.clone();
        inputs.estimated_monthly_support = Some(monthly_support);

        CalculationRecord::new(
            Self::FORM_TYPE,
            RentAssistanceOutput {
                monthly_support,
                total_support,
            },
            inputs,
        )
    }

    fn summary(
        &self,
        output: &RentAssistanceOutput,
    ) -> String {
        format!(
            "Aylık Destek: {}, Toplam: {}",
            format_currency(output.monthly_support),
            format_currency(output.total_support)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn input(
        city: &str,
        months: u64,
    ) -> RentAssistanceInput {
        RentAssistanceInput {
            city: city.to_string(),
            status: Some(ResidentStatus::Tenant),
            months,
            estimated_monthly_support: None,
        }
    }

    #[test]
    fn validate_lists_errors_in_field_order() {
        let data = RentAssistanceInput {
            months: 0,
            ..Default::default()
        };

        assert_eq!(
            RentAssistanceCalculator::default().validate(&data),
            vec![
                RentAssistanceError::MissingCity,
                RentAssistanceError::MissingStatus,
                RentAssistanceError::InvalidMonthCount,
            ]
        );
    }

    #[test]
    fn default_input_prefills_eighteen_months() {
        assert_eq!(RentAssistanceInput::default().months, 18);
    }

    #[test]
    fn ankara_rate_applies_for_each_month() {
        let record = RentAssistanceCalculator::default().calculate(&input("Ankara", 18));

        assert_eq!(record.output.monthly_support, dec!(4500));
        assert_eq!(record.output.total_support, dec!(81000));
        assert_eq!(record.inputs.estimated_monthly_support, Some(dec!(4500)));
    }

    #[test]
    fn dotted_capital_i_is_normalised() {
        let record = RentAssistanceCalculator::default().calculate(&input("  İstanbul ", 2));

        assert_eq!(record.output.monthly_support, dec!(5500));
    }

    #[test]
    fn unknown_city_uses_fallback_rate() {
        let record = RentAssistanceCalculator::default().calculate(&input("Eskişehir", 10));

        assert_eq!(record.output.total_support, dec!(30000));
    }

    #[test]
    fn custom_rates_without_fallback_yield_zero() {
        let calculator = RentAssistanceCalculator::new(RentSupportRates::new(BTreeMap::from([(
            "Ankara".to_string(),
            dec!(5000),
        )])));

        assert_eq!(calculator.rates().rate_for("ankara"), dec!(5000));
        assert_eq!(calculator.calculate(&input("Bursa", 12)).output.total_support, dec!(0));
    }

    #[test]
    fn status_uses_original_wire_names() {
        let json = serde_json::to_string(&ResidentStatus::LimitedRealRight).unwrap();

        assert_eq!(json, "\"sinirli-ayni-hak\"");
        assert_eq!(ResidentStatus::parse("malik"), Some(ResidentStatus::Owner));
    }

    #[test]
    fn huge_rate_reports_zero_total() {
        let rates = RentSupportRates::new(BTreeMap::from([("ankara".to_string(), Decimal::MAX)]));
        let calculator = RentAssistanceCalculator::new(rates);

        let out = calculator.calculate(&input("Ankara", 18)).output;

        assert_eq!(out.monthly_support, Decimal::MAX);
        assert_eq!(out.total_support, Decimal::ZERO);
    }
}
