use super::funds::PlanConfig;
use super::types::{DecumulationResult, DrawdownPolicy, PensionSeries, PlanInput, StatePensionPolicy};

/// Drawdown runs until age 100 at the latest.
const HORIZON_AGE: u32 = 100;

/// Below one currency unit the pot counts as depleted.
const DEPLETION_FLOOR: f64 = 1.0;

/// Simulates monthly drawdown of the multi-fund pot from retirement until
/// age 100 or depletion.
///
/// All withdrawals come out of fund 0, the low-risk pot. Higher-risk funds
/// top it up one at a time when it runs low, and everything is swept into it
/// once the configured de-risking age is reached.
pub fn run_decumulation(
    input: &PlanInput,
    config: &PlanConfig,
    starting_pot: f64,
) -> DecumulationResult {
    let fund_count = input.decumulation_funds.len().max(1);
    let pension_annual_start = match input.state_pension {
        StatePensionPolicy::None => None,
        StatePensionPolicy::Standard => Some(config.standard_state_pension_annual),
        StatePensionPolicy::Custom(amount) => Some(amount),
    };
    let month_cap = (HORIZON_AGE.saturating_sub(input.retirement_age) as usize) * 12;

    if !starting_pot.is_finite() || starting_pot <= 0.0 || month_cap == 0 {
        return zero_result(fund_count, pension_annual_start.is_some());
    }

    // Monthly rate is annualReturn / 12, a linear approximation kept for
    // parity with the published tool.
    let monthly_rates: Vec<f64> = input
        .decumulation_funds
        .iter()
        .map(|&fund| config.funds.profile(fund).mean_return / 12.0)
        .collect();

    let mut balances = vec![starting_pot / fund_count as f64; fund_count];
    let mut moved = vec![false; fund_count];
    moved[0] = true;

    let mut fixed_monthly = match input.drawdown {
        DrawdownPolicy::FixedMonthly(amount) => amount,
        DrawdownPolicy::InitialPotPercentage(pct) => starting_pot * (pct / 100.0) / 12.0,
        DrawdownPolicy::PotPercentage(_) => 0.0,
    };

    let mut pension_monthly = pension_annual_start.map(|annual| annual / 12.0);
    let mut pension_annual = pension_annual_start;

    let mut fund_series: Vec<Vec<f64>> = vec![Vec::new(); fund_count];
    let mut monthly_withdrawals = Vec::new();
    let mut annual_withdrawals = Vec::new();
    let mut pension_monthly_series = Vec::new();
    let mut pension_annual_series = Vec::new();

    let mut annual_total = 0.0;
    let mut age = input.retirement_age;
    let mut month = 0usize;

    while month < month_cap {
        let total: f64 = balances.iter().sum();
        let requested = match input.drawdown {
            DrawdownPolicy::PotPercentage(pct) => total * (pct / 100.0) / 12.0,
            DrawdownPolicy::FixedMonthly(_) | DrawdownPolicy::InitialPotPercentage(_) => {
                fixed_monthly
            }
        };

        // Withdrawals never exceed what the low-risk pot holds.
        let withdrawal = requested.clamp(0.0, balances[0]);
        balances[0] -= withdrawal;
        annual_total += withdrawal;

        for (balance, rate) in balances.iter_mut().zip(monthly_rates.iter()) {
            *balance = (*balance * (1.0 + rate)).max(0.0);
        }

        let year_boundary = month % 12 == 11;
        if year_boundary {
            rebalance_active_funds(&mut balances);
        }

        // Top-up rule: one not-yet-moved fund per month, once fund 0 holds
        // less than a year of the current withdrawal.
        if balances[0] < 12.0 * withdrawal {
            if let Some(index) = (1..fund_count).find(|&i| !moved[i] && balances[i] > 0.0) {
                balances[0] += balances[index];
                balances[index] = 0.0;
                moved[index] = true;
            }
        }

        if age >= input.age_to_low_risk {
            for index in 1..fund_count {
                balances[0] += balances[index];
                balances[index] = 0.0;
                moved[index] = true;
            }
        }

        if year_boundary {
            annual_withdrawals.push(annual_total);
            annual_total = 0.0;
            if matches!(
                input.drawdown,
                DrawdownPolicy::FixedMonthly(_) | DrawdownPolicy::InitialPotPercentage(_)
            ) {
                fixed_monthly *= 1.0 + input.inflation_rate;
            }
            if let (Some(monthly), Some(annual)) =
                (pension_monthly.as_mut(), pension_annual.as_mut())
            {
                pension_annual_series.push(*annual);
                *monthly *= 1.0 + input.inflation_rate;
                *annual *= 1.0 + input.inflation_rate;
            }
        }

        for (series, balance) in fund_series.iter_mut().zip(balances.iter()) {
            series.push(*balance);
        }
        monthly_withdrawals.push(withdrawal);
        if let Some(monthly) = pension_monthly {
            pension_monthly_series.push(monthly);
        }

        let remaining: f64 = balances.iter().sum();
        if remaining < DEPLETION_FLOOR {
            if annual_total > 0.0 {
                annual_withdrawals.push(annual_total);
                if let Some(annual) = pension_annual {
                    pension_annual_series.push(annual);
                }
            }
            break;
        }

        month += 1;
        age = input.retirement_age + (month / 12) as u32;
    }

    let state_pension = pension_annual_start.map(|_| PensionSeries {
        monthly: pension_monthly_series,
        annual: pension_annual_series,
    });

    DecumulationResult {
        fund_balances: fund_series,
        monthly_withdrawals,
        annual_withdrawals,
        state_pension,
    }
}

/// Year-end rebalance: spreads the combined total evenly across funds that
/// still hold a positive balance. Zeroed funds stay zeroed.
fn rebalance_active_funds(balances: &mut [f64]) {
    let active: Vec<usize> = balances
        .iter()
        .enumerate()
        .filter(|(_, b)| **b > 0.0)
        .map(|(i, _)| i)
        .collect();
    if active.len() <= 1 {
        return;
    }

    let total: f64 = active.iter().map(|&i| balances[i]).sum();
    let share = total / active.len() as f64;
    for index in active {
        balances[index] = share;
    }
}

/// A pot that never existed still yields a well-formed, single-period trace
/// so downstream charting never sees malformed data.
fn zero_result(fund_count: usize, pension: bool) -> DecumulationResult {
    DecumulationResult {
        fund_balances: vec![vec![0.0]; fund_count],
        monthly_withdrawals: vec![0.0],
        annual_withdrawals: vec![0.0],
        state_pension: pension.then(|| PensionSeries {
            monthly: vec![0.0],
            annual: vec![0.0],
        }),
    }
}
