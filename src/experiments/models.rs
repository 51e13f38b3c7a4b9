//! The model variants the experiments solve, assembled from the block library.
use super::economy::Economy;
use crate::error::{ModelError, Result};
use crate::graph::{library, Block, Model, ModelBlock};
use crate::household::store::REALIZED_UI_INPUT;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    Standard,
    TaxRateShock,
    LaggedTaylor,
    FixedRealRate,
    FixedRealRateRealizedUi,
    TaxCutFixedRealRate,
    StandardRealizedUi,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 7] = [
        ModelVariant::Standard,
        ModelVariant::TaxRateShock,
        ModelVariant::LaggedTaylor,
        ModelVariant::FixedRealRate,
        ModelVariant::FixedRealRateRealizedUi,
        ModelVariant::TaxCutFixedRealRate,
        ModelVariant::StandardRealizedUi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::Standard => "hank_sam",
            ModelVariant::TaxRateShock => "hank_sam_tax_rate_shock",
            ModelVariant::LaggedTaylor => "hank_sam_lagged_taylor",
            ModelVariant::FixedRealRate => "hank_sam_fixed_real_rate",
            ModelVariant::FixedRealRateRealizedUi => "hank_sam_fixed_real_rate_ui_extend_real",
            ModelVariant::TaxCutFixedRealRate => "hank_sam_tax_cut_fixed_real_rate",
            ModelVariant::StandardRealizedUi => "hank_sam_ui_extend_real",
        }
    }

    fn fixed_real_rate(&self) -> bool {
        matches!(
            self,
            ModelVariant::FixedRealRate | ModelVariant::FixedRealRateRealizedUi | ModelVariant::TaxCutFixedRealRate
        )
    }

    fn realized_ui(&self) -> bool {
        matches!(self, ModelVariant::FixedRealRateRealizedUi | ModelVariant::StandardRealizedUi)
    }

    /// Equation blocks of the variant, household and employment blocks excluded.
    fn equations(&self) -> Vec<Block> {
        let (budget, rule) = match self {
            ModelVariant::TaxRateShock => (library::fiscal_g(), library::fiscal_rule_g()),
            ModelVariant::TaxCutFixedRealRate => (library::fiscal_g_fixed_real_rate(), library::fiscal_rule_g()),
            v if v.fixed_real_rate() => (library::fiscal_fixed_real_rate(), library::fiscal_rule()),
            _ => (library::fiscal(), library::fiscal_rule()),
        };

        let mut blocks = vec![
            budget,
            rule,
            library::production(),
            library::matching(),
            library::phillips_curve(),
            library::marginal_cost(),
            library::hiring_cost(),
            library::wage(),
            library::vacancies(),
            library::unemployment(),
            library::market_clearing(),
        ];
        if self.fixed_real_rate() {
            blocks.push(library::fisher_fixed_real_rate());
        } else {
            blocks.push(library::bond_price());
            blocks.push(library::ex_post_rate());
            blocks.push(library::fisher());
            blocks.push(match self {
                ModelVariant::LaggedTaylor => library::taylor_lagged(),
                _ => library::taylor(),
            });
        }
        blocks
    }

    pub fn build(&self, economy: &Economy) -> Result<Model> {
        let household = if self.realized_ui() {
            economy.household_realized.clone().ok_or_else(|| ModelError::MissingJacobian {
                output: "C".into(),
                input: REALIZED_UI_INPUT.into(),
            })?
        } else {
            economy.household.clone()
        };

        let mut blocks: Vec<ModelBlock> = vec![household.into(), economy.ujac.clone().into()];
        if let Some(by_educ) = &economy.household_by_educ {
            blocks.push(by_educ.clone().into());
        }
        blocks.extend(self.equations().into_iter().map(ModelBlock::from));
        Model::new(self.name(), blocks)
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ModelError::UnknownVariant(s.to_string()))
    }
}
