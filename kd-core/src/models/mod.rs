mod form_type;
mod record;
mod scenario;

pub use form_type::FormType;
pub use record::CalculationRecord;
pub use scenario::Scenario;
