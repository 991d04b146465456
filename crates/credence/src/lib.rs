pub mod config;
pub mod credibility;
pub mod error;
pub mod telemetry;
