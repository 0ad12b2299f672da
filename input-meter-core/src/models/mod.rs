pub mod category;
pub mod config;
pub mod error;
pub mod meter_value;
pub mod state;
