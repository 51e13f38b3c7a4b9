use std::time::Duration;
use tracing::{info, warn};

/// Residual level above which a linear solve is reported as inaccurate.
const RESIDUAL_WARN: f64 = 1e-8;

/// Diagnostics of one sequence-space solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveTelemetry {
    pub model: String,
    pub horizon: usize,
    pub unknowns: usize,
    pub targets: usize,
    /// Variables with a non-constant response.
    pub tracked_variables: usize,
    /// `max |H_U dU + H_Z|` over all target rows.
    pub max_target_residual: f64,
    pub elapsed: Duration,
}

impl SolveTelemetry {
    pub fn is_accurate(&self) -> bool {
        self.max_target_residual.is_finite() && self.max_target_residual < RESIDUAL_WARN
    }

    pub fn log(&self) {
        if self.is_accurate() {
            info!(
                model = %self.model,
                horizon = self.horizon,
                unknowns = self.unknowns,
                tracked = self.tracked_variables,
                residual = self.max_target_residual,
                elapsed_ms = self.elapsed.as_millis() as u64,
                "Solved impulse response"
            );
        } else {
            warn!(
                model = %self.model,
                residual = self.max_target_residual,
                "Impulse response leaves large target residuals"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_threshold() {
        let mut t = SolveTelemetry {
            model: "m".into(),
            horizon: 10,
            unknowns: 1,
            targets: 1,
            tracked_variables: 3,
            max_target_residual: 1e-12,
            elapsed: Duration::from_millis(1),
        };
        assert!(t.is_accurate());
        t.max_target_residual = f64::NAN;
        assert!(!t.is_accurate());
    }
}
