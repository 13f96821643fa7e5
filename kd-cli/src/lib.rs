pub mod app;
pub mod commands;
pub mod config;
pub mod leads;
pub mod logging;
pub mod rates;
pub mod utils;
