pub mod config;
pub mod error;
pub mod locations;
pub mod search;
pub mod telemetry;
