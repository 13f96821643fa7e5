use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kd_core::store::{CalculatorStore, KeyValueStore};
use kd_data::{UnitListLoader, UnitMixLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    /// Independent units for arsapayi (`no,gross_area`).
    Units,
    /// Unit types for daire (`name,gross_area,proportion`).
    Mix,
}

/// Loads a CSV file into the saved inputs of the matching tool.
pub async fn run<S: KeyValueStore>(
    store: &CalculatorStore<S>,
    path: &Path,
    kind: ImportKind,
) -> Result<String> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    match kind {
        ImportKind::Units => {
            let units = UnitListLoader::parse(file)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let input = UnitListLoader::load(store, units).await;
            Ok(format!(
                "Imported {} units into arsapayi (scale {}).",
                input.units.len(),
                input.share_scale
            ))
        }
        ImportKind::Mix => {
            let unit_types = UnitMixLoader::parse(file)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let input = UnitMixLoader::load(store, unit_types).await;
            Ok(format!(
                "Imported {} unit types into daire.",
                input.unit_types.len()
            ))
        }
    }
}
