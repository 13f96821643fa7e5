pub mod loader;

pub use loader::{CsvImportError, UnitListLoader, UnitMixLoader, UnitRecord, UnitTypeRecord};
