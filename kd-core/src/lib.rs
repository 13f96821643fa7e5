pub mod calculations;
pub mod format;
pub mod lead;
pub mod models;
pub mod session;
pub mod store;
pub mod wizard;

pub use calculations::{Calculator, RecordOf};
pub use models::*;
pub use session::ToolSession;
pub use store::{CalculatorStore, KeyValueStore, StoreError};
pub use wizard::{Wizard, WizardError, WizardForm, step_title};
