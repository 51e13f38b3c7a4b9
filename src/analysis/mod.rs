//! Structural analysis of composed models and diagnostics of solved systems.
pub mod telemetry;
pub mod topology;

pub use telemetry::SolveTelemetry;
