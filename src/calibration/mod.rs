//! Labor-market calibration, the unemployment Jacobian and the GE steady state.
pub mod general_equilibrium;
pub mod labor;
pub mod params;
pub mod unemployment_jacobian;

pub use general_equilibrium::GeCalibration;
pub use labor::{job_separation, stationary_distribution, transition_matrix, LaborMarket};
pub use params::{Calibration, ExperimentConfig, ParamOverrides};
pub use unemployment_jacobian::{column_deviation, unemployment_jacobian, UnemploymentJacobian};
