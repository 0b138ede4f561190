use serde::Serialize;

/// The five selectable funds, ordered from lowest to highest risk.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fund {
    FutureAdvantage1,
    FutureAdvantage2,
    FutureAdvantage3,
    FutureAdvantage4,
    FutureAdvantage5,
}

impl Fund {
    pub const ALL: [Fund; 5] = [
        Fund::FutureAdvantage1,
        Fund::FutureAdvantage2,
        Fund::FutureAdvantage3,
        Fund::FutureAdvantage4,
        Fund::FutureAdvantage5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Fund::FutureAdvantage1 => "Future Advantage 1",
            Fund::FutureAdvantage2 => "Future Advantage 2",
            Fund::FutureAdvantage3 => "Future Advantage 3",
            Fund::FutureAdvantage4 => "Future Advantage 4",
            Fund::FutureAdvantage5 => "Future Advantage 5",
        }
    }

    pub fn from_name(name: &str) -> Option<Fund> {
        Fund::ALL.iter().copied().find(|f| f.name() == name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DrawdownPolicy {
    /// Annual percentage of the current total pot, recomputed every month.
    PotPercentage(f64),
    /// Fixed amount per month, inflated at each year boundary.
    FixedMonthly(f64),
    /// Fixed monthly amount computed once from the starting pot, then inflated.
    InitialPotPercentage(f64),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StatePensionPolicy {
    None,
    /// The configured standard annual amount.
    Standard,
    /// A user-supplied annual amount.
    Custom(f64),
}

/// A fully parsed and range-checked projection request.
///
/// Rates are fractions (0.02 = 2%), converted from the percent values the
/// form submits during validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub salary: f64,
    pub current_pot: f64,
    pub contribution_rate: f64,
    pub inflation_rate: f64,
    pub accumulation_fund: Fund,
    /// Ordered decumulation pots, 1 to 5 entries. Index 0 is the low-risk pot
    /// that all withdrawals are drawn from.
    pub decumulation_funds: Vec<Fund>,
    pub age_to_low_risk: u32,
    pub drawdown: DrawdownPolicy,
    pub state_pension: StatePensionPolicy,
    pub seed: u64,
    pub paths: u32,
}

/// Per-year percentile bands across all simulated accumulation paths.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulationResult {
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
}

impl AccumulationResult {
    pub fn years(&self) -> usize {
        self.p50.len()
    }

    /// Median pot at retirement; zero when there are no accumulation years.
    pub fn terminal_median(&self) -> f64 {
        self.p50.last().copied().unwrap_or(0.0)
    }

    pub fn terminal(&self) -> PercentileTriple {
        PercentileTriple {
            p25: self.p25.last().copied().unwrap_or(0.0),
            p50: self.p50.last().copied().unwrap_or(0.0),
            p75: self.p75.last().copied().unwrap_or(0.0),
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileTriple {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// State pension amounts tracked alongside the drawdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionSeries {
    /// Monthly pension income, one entry per simulated month.
    pub monthly: Vec<f64>,
    /// Annual pension income, one entry per completed (or flushed) year.
    pub annual: Vec<f64>,
}

/// Month-by-month drawdown trace, built incrementally and immutable once the
/// simulation ends.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecumulationResult {
    /// One balance series per fund; all series have the same length.
    pub fund_balances: Vec<Vec<f64>>,
    /// Withdrawal taken in each month.
    pub monthly_withdrawals: Vec<f64>,
    /// Withdrawals aggregated per year, including a flushed partial year.
    pub annual_withdrawals: Vec<f64>,
    pub state_pension: Option<PensionSeries>,
}

impl DecumulationResult {
    pub fn months(&self) -> usize {
        self.monthly_withdrawals.len()
    }

    pub fn total_at_month(&self, month: usize) -> f64 {
        self.fund_balances.iter().map(|series| series[month]).sum()
    }
}
