use anyhow::{Result, bail};
use kd_core::calculations::{
    AreaRatioCalculator, Calculator, CostBandCalculator, RecordOf, RevenueShareCalculator,
    UnitMixCalculator,
};
use kd_core::models::FormType;
use kd_core::session::ToolSession;
use kd_core::session::mappers::{
    area_ratio_to_cost_band, area_ratio_to_unit_mix, unit_mix_to_revenue_share,
};
use kd_core::store::{CalculatorStore, KeyValueStore};

/// Pre-fills the inputs of `to` from the last result of `from` and returns
/// the new inputs as JSON.
pub async fn run<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    from: FormType,
    to: FormType,
) -> Result<String> {
    match (from, to) {
        (FormType::AreaRatio, FormType::UnitMix) => {
            apply::<AreaRatioCalculator, _, _>(UnitMixCalculator, store, area_ratio_to_unit_mix)
                .await
        }
        (FormType::AreaRatio, FormType::CostBand) => {
            apply::<AreaRatioCalculator, _, _>(
                CostBandCalculator::default(),
                store,
                area_ratio_to_cost_band,
            )
            .await
        }
        (FormType::UnitMix, FormType::RevenueShare) => {
            apply::<UnitMixCalculator, _, _>(
                RevenueShareCalculator::default(),
                store,
                unit_mix_to_revenue_share,
            )
            .await
        }
        _ => bail!("no hand-off from {from} to {to}"),
    }
}

async fn apply<Src, C, S>(
    calculator: C,
    store: &CalculatorStore<S>,
    mapper: fn(&RecordOf<Src>, &mut C::Input),
) -> Result<String>
where
    Src: Calculator,
    C: Calculator,
    S: KeyValueStore,
{
    let mut session = ToolSession::open(calculator, store).await;
    if !session.load_from::<Src, _>(mapper).await {
        bail!(
            "no saved {} result; run `kd calc {}` first",
            Src::FORM_TYPE.title(),
            Src::FORM_TYPE
        );
    }

    tracing::info!(from = %Src::FORM_TYPE, to = %C::FORM_TYPE, "inputs pre-filled");
    Ok(serde_json::to_string_pretty(session.inputs())?)
}
