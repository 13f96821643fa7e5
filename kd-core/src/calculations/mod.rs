//! Calculator tools for urban-redevelopment pre-feasibility.
//!
//! Each tool is a small, pure calculator: it validates a possibly
//! incomplete input record and, once the input is valid, derives a handful
//! of numbers from it. Callers must gate [`Calculator::calculate`] on an
//! empty [`Calculator::validate`] result; `calculate` does not re-validate
//! and returns zeroed or omitted fields for input it cannot make sense of.

pub mod common;
pub mod tools;

use serde::{Serialize, de::DeserializeOwned};

use crate::models::{CalculationRecord, FormType};

pub use tools::{
    area_ratio::{AreaRatioCalculator, AreaRatioError, AreaRatioInput, AreaRatioOutput},
    cost_band::{CostBandCalculator, CostBandError, CostBandInput, CostBandOutput, CostTiers, QualityTier},
    land_share::{
        IndependentUnit, LandShareCalculator, LandShareError, LandShareInput, LandShareOutput,
        UnitShare,
    },
    mini_feasibility::{
        MiniFeasibilityCalculator, MiniFeasibilityError, MiniFeasibilityInput,
        MiniFeasibilityOutput,
    },
    rent_assistance::{
        RentAssistanceCalculator, RentAssistanceError, RentAssistanceInput,
        RentAssistanceOutput, RentSupportRates, ResidentStatus,
    },
    revenue_share::{
        RevenueShareCalculator, RevenueShareError, RevenueShareInput, RevenueShareOutput,
    },
    timeline::{
        Phase, PhaseId, ProjectStatus, TimelineCalculator, TimelineError, TimelineInput,
        TimelineOutput,
    },
    unit_mix::{UnitMixCalculator, UnitMixError, UnitMixInput, UnitMixMode, UnitMixOutput, UnitType, UnitTypeCount},
};

/// Shorthand for the record a calculator produces.
pub type RecordOf<C> = CalculationRecord<<C as Calculator>::Output, <C as Calculator>::Input>;

/// The contract shared by every calculator tool.
pub trait Calculator {
    /// Tag under which inputs and results are stored.
    const FORM_TYPE: FormType;

    type Input: Clone + Serialize + DeserializeOwned;
    type Output: Clone + Serialize + DeserializeOwned;
    type Error: std::error::Error;

    /// Values a fresh form starts from.
    fn initial_input(&self) -> Self::Input;

    /// Checks a possibly incomplete input. An empty list means the input
    /// can be calculated. Errors are listed in field-check order.
    fn validate(
        &self,
        input: &Self::Input,
    ) -> Vec<Self::Error>;

    /// Derives the tool's output from a validated input.
    fn calculate(
        &self,
        input: &Self::Input,
    ) -> CalculationRecord<Self::Output, Self::Input>;

    /// One-line summary of an output, used in outgoing messages.
    fn summary(
        &self,
        _output: &Self::Output,
    ) -> String {
        "Hesaplama tamamlandı".to_string()
    }

    /// Validates, then calculates when the input is valid.
    fn evaluate(
        &self,
        input: &Self::Input,
    ) -> Result<CalculationRecord<Self::Output, Self::Input>, Vec<Self::Error>> {
        let errors = self.validate(input);
        if errors.is_empty() {
            Ok(self.calculate(input))
        } else {
            Err(errors)
        }
    }
}
