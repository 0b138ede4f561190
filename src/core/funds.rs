use super::types::Fund;

/// Annual return assumptions for one fund.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FundProfile {
    pub fund: Fund,
    pub mean_return: f64,
    pub volatility: f64,
}

/// The fixed five-fund lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct FundTable {
    profiles: [FundProfile; 5],
}

impl FundTable {
    pub fn new(profiles: [FundProfile; 5]) -> Self {
        Self { profiles }
    }

    pub fn profile(&self, fund: Fund) -> FundProfile {
        self.profiles
            .iter()
            .copied()
            .find(|p| p.fund == fund)
            .unwrap_or(self.profiles[0])
    }

    pub fn profiles(&self) -> &[FundProfile; 5] {
        &self.profiles
    }
}

impl Default for FundTable {
    fn default() -> Self {
        let profile = |fund, mean_return, volatility| FundProfile {
            fund,
            mean_return,
            volatility,
        };
        Self {
            profiles: [
                profile(Fund::FutureAdvantage1, 0.021, 0.0187),
                profile(Fund::FutureAdvantage2, 0.029, 0.0510),
                profile(Fund::FutureAdvantage3, 0.038, 0.0860),
                profile(Fund::FutureAdvantage4, 0.046, 0.1163),
                profile(Fund::FutureAdvantage5, 0.053, 0.1464),
            ],
        }
    }
}

/// Constants the core consumes but does not own: the fund table and the
/// standard state pension amount.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanConfig {
    pub funds: FundTable,
    /// Annual amount used by the "standard" state pension policy.
    pub standard_state_pension_annual: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            funds: FundTable::default(),
            standard_state_pension_annual: 9_339.20,
        }
    }
}
