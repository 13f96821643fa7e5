use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::validate_phone_number;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeadFormError {
    #[error("Ad Soyad zorunludur")]
    MissingName,

    #[error("Telefon numarası zorunludur")]
    MissingPhone,

    #[error("Geçerli bir telefon numarası girin (örn: 0532 123 45 67)")]
    InvalidPhone,

    #[error("İlçe zorunludur")]
    MissingDistrict,

    #[error("Mahalle zorunludur")]
    MissingNeighborhood,

    #[error("KVKK onayı zorunludur")]
    MissingConsent,
}

/// Whether the parcel's title deed and zoning documents are at hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentAvailability {
    Evet,
    #[default]
    Hayir,
}

/// Contact form shown after a calculation, asking for a detailed report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    #[serde(rename = "adSoyad", default)]
    pub full_name: String,

    #[serde(rename = "telefon", default)]
    pub phone: String,

    #[serde(rename = "ilce", default)]
    pub district: String,

    #[serde(rename = "mahalle", default)]
    pub neighborhood: String,

    #[serde(rename = "tapuImarBelgesi", default)]
    pub has_documents: DocumentAvailability,

    #[serde(rename = "notlar", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(rename = "kvkkOnay", default)]
    pub consent: bool,
}

impl LeadForm {
    /// Checks required fields and the phone format, in form order.
    pub fn validate(&self) -> Vec<LeadFormError> {
        let mut errors = Vec::new();

        if self.full_name.trim().is_empty() {
            errors.push(LeadFormError::MissingName);
        }

        if self.phone.trim().is_empty() {
            errors.push(LeadFormError::MissingPhone);
        } else if !validate_phone_number(&self.phone) {
            errors.push(LeadFormError::InvalidPhone);
        }

        if self.district.trim().is_empty() {
            errors.push(LeadFormError::MissingDistrict);
        }
        if self.neighborhood.trim().is_empty() {
            errors.push(LeadFormError::MissingNeighborhood);
        }
        if !self.consent {
            errors.push(LeadFormError::MissingConsent);
        }

        errors
    }
}
