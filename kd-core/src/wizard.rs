//! Five-step pre-analysis ("ön analiz") request wizard.
//!
//! Forward moves are gated by the current step's required fields; going
//! back is always allowed. The state lives in memory only.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lead::{LeadError, LeadSink, LeadSubmission};

pub const TOTAL_STEPS: u8 = 5;

/// `formType` of wizard submissions.
pub const WIZARD_FORM_TYPE: &str = "on-analiz";

/// Heading of each step, for steps 1 to 5.
pub fn step_title(step: u8) -> Option<&'static str> {
    match step {
        1 => Some("Mülk Konumu"),
        2 => Some("Proje Tipi"),
        3 => Some("Tapu & Yapı Bilgileri"),
        4 => Some("Başvuru Amacınız"),
        5 => Some("İletişim Bilgileri"),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Step {0} is incomplete")]
    IncompleteStep(u8),

    #[error("The request has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Payload(#[from] LeadError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// An existing building.
    #[default]
    Bina,
    /// An empty parcel.
    Arsa,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    #[default]
    Offer,
    Report,
    Info,
}

/// Everything the wizard asks for. Free-text fields stay strings, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardForm {
    // Step 1: location
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub address_detail: String,

    // Step 2: property type
    pub project_type: ProjectType,

    // Step 3: parcel data
    pub ada: String,
    pub parsel: String,
    pub area: String,
    pub emsal: String,
    pub current_floors: String,
    pub building_age: String,

    // Step 4: goal
    pub goal: Goal,

    // Step 5: contact
    pub name: String,
    pub phone: String,
    pub email: String,
    pub kvkk: bool,
    pub contractor_consent: bool,
}

impl Default for WizardForm {
    fn default() -> Self {
        Self {
            city: "Ankara".to_string(),
            district: String::new(),
            neighborhood: String::new(),
            address_detail: String::new(),
            project_type: ProjectType::Bina,
            ada: String::new(),
            parsel: String::new(),
            area: String::new(),
            emsal: String::new(),
            current_floors: String::new(),
            building_age: String::new(),
            goal: Goal::Offer,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            kvkk: false,
            contractor_consent: false,
        }
    }
}

impl WizardForm {
    /// Required-field check for one step. Unknown steps are never valid.
    pub fn is_step_valid(
        &self,
        step: u8,
    ) -> bool {
        match step {
            1 => !self.district.is_empty() && !self.neighborhood.is_empty(),
            2 => true,
            3 => {
                !self.area.is_empty()
                    && (self.project_type != ProjectType::Bina || !self.current_floors.is_empty())
            }
            4 => true,
            5 => !self.name.is_empty() && !self.phone.is_empty() && self.kvkk,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wizard {
    step: u8,
    form: WizardForm,
    submitted: bool,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            step: 1,
            form: WizardForm::default(),
            submitted: false,
        }
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn form(&self) -> &WizardForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut WizardForm {
        &mut self.form
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_step_valid(
        &self,
        step: u8,
    ) -> bool {
        self.form.is_step_valid(step)
    }

    /// Advances one step when the current one is complete. Returns whether
    /// the step changed.
    pub fn next(&mut self) -> bool {
        if !self.is_step_valid(self.step) {
            tracing::debug!(step = self.step, "wizard step incomplete");
            return false;
        }
        let before = self.step;
        self.step = (self.step + 1).min(TOTAL_STEPS);
        self.step != before
    }

    pub fn back(&mut self) {
        self.step = self.step.saturating_sub(1).max(1);
    }

    /// Share of the wizard reached, `step / 5 * 100`.
    pub fn progress_percent(&self) -> u8 {
        let percent = u16::from(self.step) * 100 / u16::from(TOTAL_STEPS);
        u8::try_from(percent).unwrap_or(100)
    }

    /// Sends the form to `sink` and marks the wizard submitted.
    ///
    /// Delivery failures are logged and otherwise ignored: the request is
    /// treated as sent.
    pub async fn submit(
        &mut self,
        sink: &dyn LeadSink,
    ) -> Result<(), WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        if !self.is_step_valid(TOTAL_STEPS) {
            return Err(WizardError::IncompleteStep(TOTAL_STEPS));
        }

        let submission = LeadSubmission::new(WIZARD_FORM_TYPE, &self.form, Utc::now())?;
        if let Err(e) = sink.submit(&submission).await {
            tracing::warn!(error = %e, "pre-analysis request could not be delivered");
        }

        tracing::info!(district = %self.form.district, "pre-analysis request submitted");
        self.submitted = true;
        Ok(())
    }

    /// Clears the form and returns to step 1.
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;
    use crate::lead::MemoryLeadSink;

    struct UnreachableSink;

    #[async_trait]
    impl LeadSink for UnreachableSink {
        async fn submit(&self, _submission: &LeadSubmission) -> Result<(), LeadError> {
            Err(LeadError::Transport("connection refused".to_string()))
        }
    }

    fn completed() -> Wizard {
        let mut wizard = Wizard::new();
        let form = wizard.form_mut();
        form.district = "Çankaya".to_string();
        form.neighborhood = "Ayrancı".to_string();
        form.area = "450".to_string();
        form.current_floors = "4".to_string();
        form.name = "Ali Demir".to_string();
        form.phone = "0532 123 45 67".to_string();
        form.kvkk = true;
        wizard
    }

    // =========================================================================
    // navigation
    // =========================================================================

    #[test]
    fn starts_on_step_one_with_defaults() {
        let wizard = Wizard::new();

        assert_eq!(wizard.step(), 1);
        assert_eq!(wizard.form().city, "Ankara");
        assert_eq!(wizard.form().project_type, ProjectType::Bina);
        assert_eq!(wizard.form().goal, Goal::Offer);
        assert!(!wizard.is_submitted());
    }

    #[test]
    fn next_is_a_no_op_on_incomplete_step() {
        let mut wizard = Wizard::new();
        wizard.form_mut().district = "Çankaya".to_string();

        assert!(!wizard.next());
        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn next_walks_to_last_step_and_stops() {
        let mut wizard = completed();

        for expected in 2..=5 {
            assert!(wizard.next());
            assert_eq!(wizard.step(), expected);
        }

        assert!(!wizard.next());
        assert_eq!(wizard.step(), 5);
    }

    #[test]
    fn building_needs_floor_count_but_parcel_does_not() {
        let mut form = WizardForm {
            area: "300".to_string(),
            ..Default::default()
        };
        assert!(!form.is_step_valid(3));

        form.project_type = ProjectType::Arsa;
        assert!(form.is_step_valid(3));
    }

    #[test]
    fn back_is_unconditional_and_floored() {
        let mut wizard = completed();
        wizard.next();
        wizard.next();
        wizard.form_mut().district.clear();

        wizard.back();
        wizard.back();
        wizard.back();

        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn unknown_steps_are_invalid() {
        let wizard = completed();

        assert!(!wizard.is_step_valid(0));
        assert!(!wizard.is_step_valid(6));
    }

    #[test]
    fn every_step_has_a_title() {
        assert_eq!(step_title(1), Some("Mülk Konumu"));
        assert_eq!(step_title(5), Some("İletişim Bilgileri"));
        assert_eq!(step_title(6), None);
    }

    #[test]
    fn progress_tracks_step() {
        let mut wizard = completed();
        assert_eq!(wizard.progress_percent(), 20);

        wizard.next();
        wizard.next();
        assert_eq!(wizard.progress_percent(), 60);
    }

    #[test]
    fn progress_reaches_hundred_on_last_step() {
        let mut wizard = completed();
        let mut seen = vec![wizard.progress_percent()];
        while wizard.next() {
            seen.push(wizard.progress_percent());
        }

        assert_eq!(seen, vec![20, 40, 60, 80, 100]);
    }

    // =========================================================================
    // submit and restart
    // =========================================================================

    #[tokio::test]
    async fn submit_requires_contact_step() {
        let mut wizard = completed();
        wizard.form_mut().kvkk = false;
        let sink = MemoryLeadSink::new();

        let result = wizard.submit(&sink).await;

        assert!(matches!(result, Err(WizardError::IncompleteStep(5))));
        assert!(sink.submissions().is_empty());
        assert!(!wizard.is_submitted());
    }

    #[tokio::test]
    async fn submit_sends_flat_payload() {
        let mut wizard = completed();
        let sink = MemoryLeadSink::new();

        wizard.submit(&sink).await.unwrap();

        let sent = sink.submissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].form_type(), Some("on-analiz"));
        assert_eq!(sent[0].get("currentFloors"), Some(&Value::from("4")));
        assert_eq!(sent[0].get("projectType"), Some(&Value::from("bina")));
        assert_eq!(sent[0].get("contractorConsent"), Some(&Value::from(false)));
        assert!(sent[0].get("timestamp").is_some());
        assert!(wizard.is_submitted());
    }

    #[tokio::test]
    async fn delivery_failure_still_counts_as_submitted() {
        let mut wizard = completed();

        wizard.submit(&UnreachableSink).await.unwrap();

        assert!(wizard.is_submitted());
    }

    #[tokio::test]
    async fn second_submit_is_rejected() {
        let mut wizard = completed();
        let sink = MemoryLeadSink::new();
        wizard.submit(&sink).await.unwrap();

        assert!(matches!(
            wizard.submit(&sink).await,
            Err(WizardError::AlreadySubmitted)
        ));
        assert_eq!(sink.submissions().len(), 1);
    }

    #[tokio::test]
    async fn restart_clears_everything() {
        let mut wizard = completed();
        wizard.next();
        wizard.submit(&MemoryLeadSink::new()).await.unwrap();

        wizard.restart();

        assert_eq!(wizard, Wizard::new());
    }
}
