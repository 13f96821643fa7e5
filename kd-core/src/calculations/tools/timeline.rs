//! Takvim calculator: month range of an urban-transformation project.
//!
//! A project moves through four fixed phases. The current status of the
//! project drops the phases already completed; the remaining phases'
//! month ranges are summed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::Calculator;
use crate::models::{CalculationRecord, FormType, Scenario};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Lütfen projenizin mevcut durumunu seçin.")]
    MissingStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    Tespit,
    Anlasma,
    Ruhsat,
    Insaat,
}

impl PhaseId {
    /// Phases in project order.
    pub const ALL: [PhaseId; 4] = [Self::Tespit, Self::Anlasma, Self::Ruhsat, Self::Insaat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tespit => "tespit",
            Self::Anlasma => "anlasma",
            Self::Ruhsat => "ruhsat",
            Self::Insaat => "insaat",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tespit => "Hazırlık & Risk Tespiti",
            Self::Anlasma => "Anlaşma & Karar Süreci",
            Self::Ruhsat => "Yıkım, Proje & Ruhsat",
            Self::Insaat => "İnşaat Süreci",
        }
    }

    /// `(min, max)` duration in months.
    pub fn months(&self) -> (u64, u64) {
        match self {
            Self::Tespit => (1, 3),
            Self::Anlasma => (2, 6),
            Self::Ruhsat => (3, 8),
            Self::Insaat => (18, 36),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Tespit => "Binanın risk durumunun resmi olarak tespiti ve raporlanması.",
            Self::Anlasma => "Malikler arası 2/3 çoğunluk veya oybirliği ile karar alınması.",
            Self::Ruhsat => "Mevcut binanın yıkılması ve yeni proje için ruhsat alınması.",
            Self::Insaat => "Temel atılmasından anahtar teslimine kadar geçen kaba ve ince inşaat.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    #[serde(rename = "minAy")]
    pub min_months: u64,
    #[serde(rename = "maxAy")]
    pub max_months: u64,
    pub description: String,
}

impl From<PhaseId> for Phase {
    fn from(id: PhaseId) -> Self {
        let (min_months, max_months) = id.months();
        Self {
            id,
            name: id.name().to_string(),
            min_months,
            max_months,
            description: id.description().to_string(),
        }
    }
}

/// Where the project currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// No risk assessment yet.
    #[default]
    TespitYok,
    /// Risk assessment done.
    TespitVar,
    /// Owners' majority decision reached.
    CogunlukVar,
    /// Permit obtained.
    RuhsatAlindi,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tespit-yok" => Some(Self::TespitYok),
            "tespit-var" => Some(Self::TespitVar),
            "cogunluk-var" => Some(Self::CogunlukVar),
            "ruhsat-alindi" => Some(Self::RuhsatAlindi),
            _ => None,
        }
    }

    /// Number of leading phases already behind the project.
    pub fn completed_phases(&self) -> usize {
        match self {
            Self::TespitYok => 0,
            Self::TespitVar => 1,
            Self::CogunlukVar => 2,
            Self::RuhsatAlindi => 3,
        }
    }

    pub fn remaining_phases(&self) -> &'static [PhaseId] {
        &PhaseId::ALL[self.completed_phases()..]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineInput {
    #[serde(rename = "baslangicDurumu", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,

    /// Stored with the inputs; does not change the month ranges.
    #[serde(default)]
    pub scenario: Scenario,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineOutput {
    #[serde(rename = "fazlar")]
    pub phases: Vec<Phase>,
    #[serde(rename = "toplamMinAy")]
    pub total_min_months: u64,
    #[serde(rename = "toplamMaxAy")]
    pub total_max_months: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineCalculator;

impl Calculator for TimelineCalculator {
    const FORM_TYPE: FormType = FormType::Timeline;

    type Input = TimelineInput;
    type Output = TimelineOutput;
    type Error = TimelineError;

    fn initial_input(&self) -> TimelineInput {
        TimelineInput {
            status: Some(ProjectStatus::TespitYok),
            scenario: Scenario::Realistic,
        }
    }

    fn validate(
        &self,
        input: &TimelineInput,
    ) -> Vec<TimelineError> {
        if input.status.is_none() {
            vec![TimelineError::MissingStatus]
        } else {
            Vec::new()
        }
    }

    fn calculate(
        &self,
        input: &TimelineInput,
    ) -> CalculationRecord<TimelineOutput, TimelineInput> {
        let phases: Vec<Phase> = input
            .status
            .unwrap_or_default()
            .remaining_phases()
            .iter()
            .copied()
            .map(Phase::from)
            .collect();

        let total_min_months = phases.iter().map(|p| p.min_months).sum();
        let total_max_months = phases.iter().map(|p| p.max_months).sum();

        CalculationRecord::new(
            Self::FORM_TYPE,
            TimelineOutput {
                phases,
                total_min_months,
                total_max_months,
            },
            input.clone(),
        )
    }

    fn summary(
        &self,
        output: &TimelineOutput,
    ) -> String {
        format!(
            "Tahmini Süre: {}-{} ay",
            output.total_min_months, output.total_max_months
        )
    }
}
