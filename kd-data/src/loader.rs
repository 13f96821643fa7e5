//! CSV import for the list-shaped calculator inputs.
//!
//! ## Independent units (arsa payı)
//!
//! | Column       | Required | Type    | Notes                     |
//! |--------------|----------|---------|---------------------------|
//! | `no`         | yes      | string  | Unit number, e.g. `D1`    |
//! | `gross_area` | yes      | decimal | Gross m², `0` or more     |
//!
//! ## Unit types (daire karması)
//!
//! | Column       | Required | Type    | Notes                     |
//! |--------------|----------|---------|---------------------------|
//! | `name`       | yes      | string  | e.g. `2+1`                |
//! | `gross_area` | yes      | decimal | Gross m² of one unit      |
//! | `proportion` | yes      | decimal | Share of the mix, 0..=100 |
//!
//! Headers are matched by name and cells are trimmed. Whether the mix
//! proportions add up to 100 is left to the unit-mix calculator's own
//! validation.

use std::collections::HashSet;
use std::io::Read;

use kd_core::calculations::{
    Calculator, IndependentUnit, LandShareCalculator, LandShareInput, UnitMixCalculator,
    UnitMixInput, UnitMixMode, UnitType,
};
use kd_core::store::{CalculatorStore, KeyValueStore};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("CSV file has no data rows")]
    Empty,

    #[error("row {row}: '{column}' must not be empty")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: '{column}' must not be negative (got {value})")]
    NegativeValue {
        row: usize,
        column: &'static str,
        value: Decimal,
    },

    #[error("row {row}: proportion {value} is outside 0-100")]
    ProportionOutOfRange { row: usize, value: Decimal },

    #[error("row {row}: unit number '{no}' appears more than once")]
    DuplicateUnit { row: usize, no: String },
}

impl From<csv::Error> for CsvImportError {
    fn from(err: csv::Error) -> Self {
        CsvImportError::CsvParse(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UnitRecord {
    pub no: String,
    pub gross_area: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UnitTypeRecord {
    pub name: String,
    pub gross_area: Decimal,
    pub proportion: Decimal,
}

fn read_records<R, T>(reader: R) -> Result<Vec<T>, CsvImportError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let record: T = result?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(CsvImportError::Empty);
    }
    Ok(records)
}

fn non_negative(
    row: usize,
    column: &'static str,
    value: Decimal,
) -> Result<Decimal, CsvImportError> {
    if value < Decimal::ZERO {
        return Err(CsvImportError::NegativeValue { row, column, value });
    }
    Ok(value)
}

/// Loader for the independent-unit list of the land-share tool.
pub struct UnitListLoader;

impl UnitListLoader {
    /// Parse and check unit rows. Rows are numbered from 1, header excluded.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IndependentUnit>, CsvImportError> {
        let records: Vec<UnitRecord> = read_records(reader)?;
        let mut seen = HashSet::new();

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let row = index + 1;
                if record.no.is_empty() {
                    return Err(CsvImportError::MissingValue { row, column: "no" });
                }
                if !seen.insert(record.no.clone()) {
                    return Err(CsvImportError::DuplicateUnit { row, no: record.no });
                }
                let area = non_negative(row, "gross_area", record.gross_area)?;
                Ok(IndependentUnit::new(record.no, area))
            })
            .collect()
    }

    /// Replace the stored land-share units, keeping the stored share scale.
    ///
    /// Starts from the tool's initial input when nothing is stored yet.
    /// Returns the inputs as saved.
    pub async fn load<S: KeyValueStore>(
        store: &CalculatorStore<S>,
        units: Vec<IndependentUnit>,
    ) -> LandShareInput {
        let mut input = match store.load_inputs::<LandShareCalculator>().await {
            Some(saved) => saved,
            None => LandShareCalculator.initial_input(),
        };
        input.units = units;
        store.save_inputs::<LandShareCalculator>(&input).await;

        tracing::info!(units = input.units.len(), "imported independent units");
        input
    }
}

/// Loader for the unit-type mix of the unit-mix tool.
pub struct UnitMixLoader;

impl UnitMixLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<UnitType>, CsvImportError> {
        let records: Vec<UnitTypeRecord> = read_records(reader)?;

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let row = index + 1;
                if record.name.is_empty() {
                    return Err(CsvImportError::MissingValue { row, column: "name" });
                }
                let area = non_negative(row, "gross_area", record.gross_area)?;
                if record.proportion < Decimal::ZERO || record.proportion > HUNDRED {
                    return Err(CsvImportError::ProportionOutOfRange {
                        row,
                        value: record.proportion,
                    });
                }
                Ok(UnitType::new(record.name, area, record.proportion))
            })
            .collect()
    }

    /// Replace the stored unit types and switch the tool to mix mode.
    pub async fn load<S: KeyValueStore>(
        store: &CalculatorStore<S>,
        unit_types: Vec<UnitType>,
    ) -> UnitMixInput {
        let mut input = match store.load_inputs::<UnitMixCalculator>().await {
            Some(saved) => saved,
            None => UnitMixCalculator.initial_input(),
        };
        input.mode = UnitMixMode::Mix;
        input.unit_types = unit_types;
        store.save_inputs::<UnitMixCalculator>(&input).await;

        tracing::info!(types = input.unit_types.len(), "imported unit mix");
        input
    }
}
