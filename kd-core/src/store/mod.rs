//! Persistence for calculator inputs and results.

pub mod calculator_store;
pub mod factory;
pub mod key_value;
pub mod memory;

pub use calculator_store::{CalculatorStore, DEFAULT_NAMESPACE};
pub use factory::{MemoryStoreFactory, StoreConfig, StoreFactory, StoreRegistry};
pub use key_value::{KeyValueStore, StoreError};
pub use memory::MemoryStore;
