//! Everything a policy run reads, built once and shared.
use crate::calibration::{unemployment_jacobian, ExperimentConfig, GeCalibration, LaborMarket};
use crate::error::{ModelError, Result};
use crate::graph::JacobianBlock;
use crate::household::{apply_splurge, HouseholdJacobians, RealizedUi, SPLURGE_INPUTS};
use crate::store::SteadyState;
use std::sync::Arc;
use tracing::info;

/// The calibrated economy. Immutable once built; runs borrow it and apply
/// their overrides to a copy of the steady state.
#[derive(Debug, Clone)]
pub struct Economy {
    pub config: ExperimentConfig,
    pub labor: LaborMarket,
    pub ge: GeCalibration,
    pub steady_state: SteadyState,
    pub ujac: Arc<JacobianBlock>,
    /// Splurge-adjusted aggregate household block.
    pub household: Arc<JacobianBlock>,
    pub household_by_educ: Option<Arc<JacobianBlock>>,
    /// Household block responding to realized UI extensions, without splurge.
    pub household_realized: Option<Arc<JacobianBlock>>,
}

impl Economy {
    pub fn initialize(config: ExperimentConfig, household: HouseholdJacobians, realized: Option<RealizedUi>) -> Result<Self> {
        config.validate()?;
        let horizon = config.horizon;
        if household.horizon() != horizon {
            return Err(ModelError::ShapeMismatch {
                context: "household Jacobian horizon".into(),
                expected: horizon,
                found: household.horizon(),
            });
        }

        let cal = &config.calibration;
        let labor = LaborMarket::calibrate(cal.job_find, cal.eu_prob)?;
        let ge = GeCalibration::compute(cal, &labor);
        let steady_state = ge.steady_state();

        let ujac = unemployment_jacobian(labor.job_find, labor.job_sep, &labor.stationary, horizon, config.ujac_step)?;
        let ujac = Arc::new(ujac.to_block()?);

        let household_realized = match &realized {
            Some(r) => Some(Arc::new(household.with_realized_ui(r)?.block("household")?)),
            None => None,
        };

        let mut household = household;
        apply_splurge(&mut household, &SPLURGE_INPUTS, cal.r_gross, config.splurge_share)?;
        let household_by_educ = household.by_educ_block("household_by_educ").transpose()?.map(Arc::new);
        let household = Arc::new(household.block("household")?);

        info!(
            horizon,
            splurge = config.splurge_share,
            by_educ = household_by_educ.is_some(),
            realized_ui = household_realized.is_some(),
            "Initialized economy"
        );

        Ok(Self { config, labor, ge, steady_state, ujac, household, household_by_educ, household_realized })
    }

    /// Loads the Jacobian files named in `config` and initializes.
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        let path = config.jacobian_path.clone().ok_or_else(|| {
            ModelError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no household Jacobian path configured"))
        })?;
        let household = HouseholdJacobians::load(path)?;
        let realized = match &config.realized_ui_path {
            Some(p) => Some(HouseholdJacobians::load_realized(p)?),
            None => None,
        };
        Self::initialize(config, household, realized)
    }

    pub fn horizon(&self) -> usize { self.config.horizon }

    /// Gross steady-state real rate, the discount factor of every NPV.
    pub fn big_r(&self) -> f64 { self.config.calibration.r_gross }

    pub fn c_ss(&self) -> f64 { self.config.calibration.c_ss }
}
