use anyhow::{Context, Result, bail};
use kd_core::calculations::Calculator;
use kd_core::lead::{LeadForm, LeadSink, LeadSubmission};
use kd_core::models::FormType;
use kd_core::store::{CalculatorStore, KeyValueStore};

use super::{error_lines, with_calculator};

/// Builds the detailed-report request for the last result of `tool`.
///
/// `form` is TOML with the contact form's field names (`adSoyad`,
/// `telefon`, ...).
pub async fn build<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: FormType,
    form: &str,
) -> Result<LeadSubmission> {
    let form: LeadForm = toml::from_str(form).context("failed to parse contact form")?;

    let errors = form.validate();
    if !errors.is_empty() {
        bail!("contact form is incomplete:\n{}", error_lines(&errors));
    }

    with_calculator!(tool, |calculator| attach(calculator, store, &form).await)
}

async fn attach<C, S>(
    _calculator: C,
    store: &CalculatorStore<S>,
    form: &LeadForm,
) -> Result<LeadSubmission>
where
    C: Calculator,
    S: KeyValueStore,
{
    let Some(record) = store.load_result::<C>().await else {
        bail!(
            "no saved {} result; run `kd calc {}` first",
            C::FORM_TYPE.title(),
            C::FORM_TYPE
        );
    };
    Ok(LeadSubmission::from_calculator(form, &record)?)
}

/// Builds the request and hands it to `sink`.
///
/// A failed delivery is logged and the request still counts as sent.
pub async fn run<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    tool: FormType,
    form: &str,
    sink: &dyn LeadSink,
) -> Result<String> {
    let submission = build(store, tool, form).await?;

    if let Err(e) = sink.submit(&submission).await {
        tracing::warn!(error = %e, tool = %tool, "lead could not be delivered");
    }
    Ok("Talebiniz alındı. En kısa sürede sizinle iletişime geçeceğiz.".to_string())
}
