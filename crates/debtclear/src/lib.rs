pub mod config;
pub mod error;
pub mod import;
pub mod payoff;
pub mod telemetry;
