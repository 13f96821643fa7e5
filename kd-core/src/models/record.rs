use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FormType;

/// Self-describing result of one calculator run.
///
/// Serialises as a flat object: `formType`, `timestamp`, the tool's derived
/// fields, and the `inputs` the result was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord<O, I> {
    #[serde(rename = "formType")]
    pub form_type: FormType,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub output: O,
    pub inputs: I,
}

impl<O, I> CalculationRecord<O, I> {
    /// Stamps a freshly computed output with the current time.
    pub fn new(
        form_type: FormType,
        output: O,
        inputs: I,
    ) -> Self {
        Self {
            form_type,
            timestamp: Utc::now(),
            output,
            inputs,
        }
    }
}
