use anyhow::Result;
use kd_core::calculations::Calculator;
use kd_core::models::FormType;
use kd_core::store::{CalculatorStore, KeyValueStore};
use serde_json::json;

use super::with_calculator;

/// Saved inputs and last result of one tool, as JSON.
///
/// Absent entries print as `null`.
pub async fn show<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: FormType,
) -> Result<String> {
    with_calculator!(tool, |calculator| saved(calculator, store).await)
}

async fn saved<C, S>(
    _calculator: C,
    store: &CalculatorStore<S>,
) -> Result<String>
where
    C: Calculator,
    S: KeyValueStore,
{
    let inputs = store.load_inputs::<C>().await;
    let result = store.load_result::<C>().await;

    let document = json!({
        "formType": C::FORM_TYPE.as_str(),
        "inputs": serde_json::to_value(&inputs)?,
        "result": serde_json::to_value(&result)?,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Clears one tool, or every tool under the namespace.
pub async fn clear<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: Option<FormType>,
) -> String {
    match tool {
        Some(tool) => {
            store.clear(tool).await;
            format!("Cleared {}", tool.title())
        }
        None => {
            store.clear_all().await;
            format!("Cleared every tool under '{}'", store.namespace())
        }
    }
}
