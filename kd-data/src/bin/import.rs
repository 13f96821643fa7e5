use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kd_core::store::{CalculatorStore, DEFAULT_NAMESPACE};
use kd_data::{UnitListLoader, UnitMixLoader};
use kd_store_sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    /// Independent units for the land-share tool (`no,gross_area`).
    Units,
    /// Unit types for the unit-mix tool (`name,gross_area,proportion`).
    Mix,
}

/// Import a CSV list into the saved inputs of a calculator.
#[derive(Parser, Debug)]
#[command(name = "kd-import")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file
    #[arg(short, long)]
    file: PathBuf,

    /// What the file contains
    #[arg(short, long, value_enum)]
    kind: Kind,

    /// SQLite database file or URL
    #[arg(short, long, default_value = "kd.db")]
    database: String,

    /// Key prefix of the calculator entries
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let store = SqliteStore::connect(&args.database)
        .await
        .with_context(|| format!("Failed to open database: {}", args.database))?;
    store
        .run_migrations()
        .await
        .context("Failed to run migrations")?;
    let store = CalculatorStore::with_namespace(store, args.namespace);

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    match args.kind {
        Kind::Units => {
            let units = UnitListLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
            println!("Parsed {} units from CSV", units.len());

            let input = UnitListLoader::load(&store, units).await;
            println!(
                "Saved {} units to the land-share tool (scale {}).",
                input.units.len(),
                input.share_scale
            );
        }
        Kind::Mix => {
            let unit_types = UnitMixLoader::parse(file)
                .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;
            println!("Parsed {} unit types from CSV", unit_types.len());

            let input = UnitMixLoader::load(&store, unit_types).await;
            println!(
                "Saved {} unit types to the unit-mix tool.",
                input.unit_types.len()
            );
        }
    }

    Ok(())
}
