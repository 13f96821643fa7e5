use anyhow::{Result, bail};
use kd_core::calculations::{AreaRatioCalculator, Calculator};
use kd_core::lead::WhatsAppMessage;
use kd_core::models::FormType;
use kd_core::store::{CalculatorStore, KeyValueStore};
use rust_decimal::Decimal;

use super::with_calculator;

/// Contact details typed next to the WhatsApp button.
#[derive(Debug, Clone, Default)]
pub struct Contact {
    pub district: String,
    pub neighborhood: String,
    pub property_kind: String,
    pub phone: String,
    pub land_area: Option<Decimal>,
    pub floor_area_ratio: Option<Decimal>,
}

/// Chat link carrying the summary of the last `tool` result.
///
/// Land area and ratio default to the saved emsal inputs.
pub async fn run<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: FormType,
    contact: Contact,
) -> Result<String> {
    let summary = with_calculator!(tool, |calculator| summary(calculator, store).await)?;

    let saved = store.load_inputs::<AreaRatioCalculator>().await;
    let land_area = contact
        .land_area
        .or_else(|| saved.as_ref().map(|input| input.land_area));
    let floor_area_ratio = contact
        .floor_area_ratio
        .or_else(|| saved.as_ref().and_then(|input| input.floor_area_ratio));

    let message = WhatsAppMessage {
        district: contact.district,
        neighborhood: contact.neighborhood,
        property_kind: contact.property_kind,
        land_area,
        floor_area_ratio,
        summary,
        phone: contact.phone,
    };
    Ok(message.link()?.to_string())
}

async fn summary<C, S>(
    calculator: C,
    store: &CalculatorStore<S>,
) -> Result<String>
where
    C: Calculator,
    S: KeyValueStore,
{
    match store.load_result::<C>().await {
        Some(record) => Ok(calculator.summary(&record.output)),
        None => bail!(
            "no saved {} result; run `kd calc {}` first",
            C::FORM_TYPE.title(),
            C::FORM_TYPE
        ),
    }
}
