use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::form::LeadForm;
use crate::format::format_phone_number;
use crate::models::{CalculationRecord, FormType};

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("Lead payload must serialise to a JSON object")]
    NotAnObject,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat JSON object handed to the lead-capture collaborator.
///
/// Always carries `formType` and an ISO-8601 `timestamp` next to the form
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeadSubmission(Map<String, Value>);

impl LeadSubmission {
    /// Builds a submission from any struct that serialises to an object.
    pub fn new<T: Serialize>(
        form_type: &str,
        fields: &T,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LeadError> {
        let Value::Object(fields) = serde_json::to_value(fields)? else {
            return Err(LeadError::NotAnObject);
        };

        let mut map = Map::with_capacity(fields.len() + 2);
        map.insert("formType".to_string(), Value::from(form_type));
        map.extend(fields);
        map.insert(
            "timestamp".to_string(),
            Value::from(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Ok(Self(map))
    }

    /// Lead sent from a calculator page: `formType` is
    /// `hesaplama-<tool>`, the phone is normalised and the full result is
    /// attached as a JSON string under `calculatorData`.
    pub fn from_calculator<O, I>(
        form: &LeadForm,
        record: &CalculationRecord<O, I>,
    ) -> Result<Self, LeadError>
    where
        O: Serialize,
        I: Serialize,
    {
        let mut submission = Self::new(
            &calculator_form_type(record.form_type),
            form,
            Utc::now(),
        )?;
        submission.0.insert(
            "telefon".to_string(),
            Value::from(format_phone_number(&form.phone)),
        );
        submission.0.insert(
            "calculatorData".to_string(),
            Value::from(serde_json::to_string(record)?),
        );
        Ok(submission)
    }

    pub fn form_type(&self) -> Option<&str> {
        self.0.get("formType").and_then(Value::as_str)
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_json(&self) -> Result<String, LeadError> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// `hesaplama-<formType>`, the tag of calculator-originated leads.
pub fn calculator_form_type(form_type: FormType) -> String {
    format!("hesaplama-{}", form_type.as_str())
}

/// Destination for captured leads.
///
/// Delivery is best-effort. A sink that cannot observe the response
/// reports success once the request has been handed to the transport.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn submit(&self, submission: &LeadSubmission) -> Result<(), LeadError>;
}

/// Keeps submissions in memory; useful for dry runs.
#[derive(Debug, Default)]
pub struct MemoryLeadSink {
    submissions: Mutex<Vec<LeadSubmission>>,
}

impl MemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<LeadSubmission> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeadSink for MemoryLeadSink {
    async fn submit(&self, submission: &LeadSubmission) -> Result<(), LeadError> {
        self.submissions
            .lock()
            .map_err(|e| LeadError::Transport(format!("lead buffer poisoned: {e}")))?
            .push(submission.clone());
        Ok(())
    }
}
