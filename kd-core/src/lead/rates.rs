//! Market rates shown next to the calculators: dollar, euro, pound and
//! gram gold, as buy/sell quotes in TL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// `(feed key, display code)` for each quoted symbol, in display order.
pub const SYMBOLS: [(&str, &str); 4] = [
    ("USD", "USD"),
    ("EUR", "EUR"),
    ("GBP", "GBP"),
    ("gram-altin", "GA"),
];

#[derive(Debug, Error)]
pub enum RateFeedError {
    #[error("Rate feed returned no data")]
    Empty,

    #[error("Rate feed unreachable: {0}")]
    Transport(String),

    #[error("Rate feed response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    #[serde(rename = "Kod")]
    pub code: String,
    #[serde(rename = "Alis")]
    pub buying: String,
    #[serde(rename = "Satis")]
    pub selling: String,
    #[serde(rename = "GuncellenmeZamani")]
    pub updated_at: String,
}

/// Picks the quoted symbols out of a feed document.
///
/// Missing prices read as `"0"`; numeric prices are kept as written.
pub fn parse_rates(data: &Value) -> Result<Vec<RateQuote>, RateFeedError> {
    let Some(document) = data.as_object() else {
        return Err(if data.is_null() {
            RateFeedError::Empty
        } else {
            RateFeedError::Malformed("expected a JSON object".to_string())
        });
    };

    let updated_at = document
        .get("Update_Date")
        .map(price_text)
        .unwrap_or_default();

    Ok(SYMBOLS
        .iter()
        .map(|(key, code)| {
            let entry = document.get(*key);
            RateQuote {
                code: code.to_string(),
                buying: field(entry, "Buying"),
                selling: field(entry, "Selling"),
                updated_at: updated_at.clone(),
            }
        })
        .collect())
}

fn field(
    entry: Option<&Value>,
    name: &str,
) -> String {
    entry
        .and_then(|e| e.get(name))
        .map(price_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "0".to_string())
}

fn price_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A source of current market rates.
#[async_trait]
pub trait RateFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RateQuote>, RateFeedError>;
}
