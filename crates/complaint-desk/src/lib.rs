pub mod complaints;
pub mod config;
pub mod error;
pub mod telemetry;
