//! Subcommand implementations. Each returns the text to print.

pub mod calc;
pub mod handoff;
pub mod import;
pub mod lead;
pub mod rates;
pub mod store;
pub mod whatsapp;
pub mod wizard;

use kd_core::models::{FormType, Scenario};

/// Runs `$body` with `$calc` bound to the calculator of `$tool`.
macro_rules! with_calculator {
    ($tool:expr, |$calc:ident| $body:expr) => {{
        use kd_core::calculations::*;
        use kd_core::models::FormType;
        match $tool {
            FormType::AreaRatio => {
                let $calc = AreaRatioCalculator;
                $body
            }
            FormType::UnitMix => {
                let $calc = UnitMixCalculator;
                $body
            }
            FormType::RevenueShare => {
                let $calc = RevenueShareCalculator::default();
                $body
            }
            FormType::CostBand => {
                let $calc = CostBandCalculator::default();
                $body
            }
            FormType::RentAssistance => {
                let $calc = RentAssistanceCalculator::default();
                $body
            }
            FormType::Timeline => {
                let $calc = TimelineCalculator;
                $body
            }
            FormType::LandShare => {
                let $calc = LandShareCalculator;
                $body
            }
            FormType::MiniFeasibility => {
                let $calc = MiniFeasibilityCalculator;
                $body
            }
        }
    }};
}
pub(crate) use with_calculator;

/// clap value parser for tool tags such as `emsal` or `muteahhit-mini`.
pub fn parse_tool(s: &str) -> Result<FormType, String> {
    FormType::parse(s).ok_or_else(|| {
        let known: Vec<&str> = FormType::ALL.iter().map(FormType::as_str).collect();
        format!("unknown tool '{s}'; expected one of: {}", known.join(", "))
    })
}

pub fn parse_scenario(s: &str) -> Result<Scenario, String> {
    Scenario::parse(s)
        .ok_or_else(|| format!("unknown scenario '{s}'; expected optimistic, realistic or conservative"))
}

/// Joins validation messages, one per line.
pub(crate) fn error_lines<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
