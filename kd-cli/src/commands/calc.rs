use anyhow::{Context, Result, bail};
use kd_core::calculations::{Calculator, RevenueShareCalculator};
use kd_core::models::{FormType, Scenario};
use kd_core::session::ToolSession;
use kd_core::store::{CalculatorStore, KeyValueStore};

use super::{error_lines, with_calculator};

/// Calculates one tool.
///
/// With `input` (a JSON object of the tool's fields) the saved inputs are
/// replaced first; without it the saved or initial inputs are used. The
/// result is saved for later hand-offs.
pub async fn run<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: FormType,
    input: Option<&str>,
    scenario: Option<Scenario>,
) -> Result<String> {
    match (tool, scenario) {
        (FormType::RevenueShare, Some(scenario)) => {
            calculate(RevenueShareCalculator::for_scenario(scenario), store, input).await
        }
        _ => with_calculator!(tool, |calculator| calculate(calculator, store, input).await),
    }
}

async fn calculate<C, S>(
    calculator: C,
    store: &CalculatorStore<S>,
    input: Option<&str>,
) -> Result<String>
where
    C: Calculator,
    S: KeyValueStore,
{
    let mut session = ToolSession::open(calculator, store).await;

    if let Some(json) = input {
        let inputs: C::Input = serde_json::from_str(json)
            .with_context(|| format!("input does not fit the {} tool", C::FORM_TYPE))?;
        session.replace(inputs).await;
    }

    match session.compute().await {
        Ok(record) => {
            let body = serde_json::to_string_pretty(&record)?;
            Ok(format!("{body}\n\n{}", session.summary(&record)))
        }
        Err(errors) => bail!(
            "{} inputs are incomplete:\n{}",
            C::FORM_TYPE.title(),
            error_lines(&errors)
        ),
    }
}
