use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one of the calculator tools.
///
/// The string form is the stable tag used in persisted keys, result
/// envelopes and lead payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormType {
    #[serde(rename = "emsal")]
    AreaRatio,
    #[serde(rename = "daire")]
    UnitMix,
    #[serde(rename = "paylasim")]
    RevenueShare,
    #[serde(rename = "maliyet")]
    CostBand,
    #[serde(rename = "destek")]
    RentAssistance,
    #[serde(rename = "takvim")]
    Timeline,
    #[serde(rename = "arsapayi")]
    LandShare,
    #[serde(rename = "muteahhit-mini")]
    MiniFeasibility,
}

impl FormType {
    pub const ALL: [FormType; 8] = [
        Self::AreaRatio,
        Self::UnitMix,
        Self::RevenueShare,
        Self::CostBand,
        Self::RentAssistance,
        Self::Timeline,
        Self::LandShare,
        Self::MiniFeasibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AreaRatio => "emsal",
            Self::UnitMix => "daire",
            Self::RevenueShare => "paylasim",
            Self::CostBand => "maliyet",
            Self::RentAssistance => "destek",
            Self::Timeline => "takvim",
            Self::LandShare => "arsapayi",
            Self::MiniFeasibility => "muteahhit-mini",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "emsal" => Some(Self::AreaRatio),
            "daire" => Some(Self::UnitMix),
            "paylasim" => Some(Self::RevenueShare),
            "maliyet" => Some(Self::CostBand),
            "destek" => Some(Self::RentAssistance),
            "takvim" => Some(Self::Timeline),
            "arsapayi" => Some(Self::LandShare),
            "muteahhit-mini" => Some(Self::MiniFeasibility),
            _ => None,
        }
    }

    /// Display title used in prompts and summaries.
    pub fn title(&self) -> &'static str {
        match self {
            Self::AreaRatio => "Emsal (TAKS-KAKS) Hesaplama",
            Self::UnitMix => "Daire Adedi & Tip Dağılımı",
            Self::RevenueShare => "Paylaşım Simülatörü",
            Self::CostBand => "İnşaat Maliyet Bandı",
            Self::RentAssistance => "Kira Yardımı Hesaplama",
            Self::Timeline => "Proje Takvimi",
            Self::LandShare => "Arsa Payı Dağılımı",
            Self::MiniFeasibility => "Müteahhit Mini Fizibilite",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_every_tag() {
        for form_type in FormType::ALL {
            assert_eq!(FormType::parse(form_type.as_str()), Some(form_type));
        }
    }

    #[test]
    fn parse_rejects_unknown_tag() {
        assert_eq!(FormType::parse("on-analiz"), None);
    }

    #[test]
    fn serde_uses_wire_tag() {
        let json = serde_json::to_string(&FormType::MiniFeasibility).unwrap();

        assert_eq!(json, "\"muteahhit-mini\"");
    }
}
