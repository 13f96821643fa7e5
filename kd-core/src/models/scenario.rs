use serde::{Deserialize, Serialize};

/// Outlook selected by the user where a tool offers presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Optimistic,
    #[default]
    Realistic,
    Conservative,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::Realistic => "realistic",
            Self::Conservative => "conservative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optimistic" => Some(Self::Optimistic),
            "realistic" => Some(Self::Realistic),
            "conservative" => Some(Self::Conservative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Optimistic => "İyimser",
            Self::Realistic => "Standart",
            Self::Conservative => "Temkinli",
        }
    }
}
