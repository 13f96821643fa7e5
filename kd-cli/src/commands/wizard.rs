use anyhow::{Context, Result, bail};
use kd_core::lead::LeadSink;
use kd_core::wizard::{TOTAL_STEPS, Wizard, WizardForm, step_title};

/// Walks the pre-analysis wizard with a filled-in form and submits it.
///
/// `form` is TOML with the wizard's camelCase field names. The walk stops
/// at the first incomplete step.
pub async fn run(
    form: &str,
    sink: &dyn LeadSink,
) -> Result<String> {
    let form: WizardForm = toml::from_str(form).context("failed to parse wizard form")?;

    let mut wizard = Wizard::new();
    *wizard.form_mut() = form;

    let mut lines = Vec::new();
    loop {
        let step = wizard.step();
        if !wizard.is_step_valid(step) {
            bail!(
                "step {step}/{TOTAL_STEPS} ({}) is incomplete",
                step_title(step).unwrap_or_default()
            );
        }
        lines.push(format!(
            "[{:>3}%] {}/{TOTAL_STEPS} {}",
            wizard.progress_percent(),
            step,
            step_title(step).unwrap_or_default()
        ));
        if !wizard.next() {
            break;
        }
    }

    wizard.submit(sink).await?;
    lines.push(format!(
        "Ön analiz talebiniz alındı: {} {}",
        wizard.form().district,
        wizard.form().neighborhood
    ));
    Ok(lines.join("\n"))
}
