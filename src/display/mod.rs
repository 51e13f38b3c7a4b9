//! Human-readable reports of experiment results.
pub mod summary;

pub use summary::format_summary;
