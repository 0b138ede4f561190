use super::funds::FundProfile;
use super::types::{AccumulationResult, PlanInput};

/// Default number of Monte Carlo paths.
pub const DEFAULT_PATHS: u32 = 1000;

/// Projects pot growth from the current age to retirement under stochastic
/// annual returns and records p25/p50/p75 across paths for every year.
pub fn run_accumulation(input: &PlanInput, profile: FundProfile) -> AccumulationResult {
    let years = input.retirement_age.saturating_sub(input.current_age) as usize;
    let paths = input.paths.max(1) as usize;

    if years == 0 {
        return AccumulationResult {
            p25: Vec::new(),
            p50: Vec::new(),
            p75: Vec::new(),
        };
    }

    let mut yearly: Vec<Vec<f64>> = (0..years).map(|_| Vec::with_capacity(paths)).collect();

    for path_id in 0..paths {
        let mut rng = Rng::new(derive_seed(input.seed, path_id as u32));
        let mut pot = input.current_pot;
        let mut salary = input.salary;

        for bucket in yearly.iter_mut() {
            let contribution = salary * input.contribution_rate;
            // Symmetric uniform noise scaled by volatility, not a normal
            // draw; kept for parity with the published tool.
            let drawn_return = profile.mean_return + profile.volatility * rng.uniform_symmetric();
            pot = (pot + contribution) * (1.0 + drawn_return);
            salary *= 1.0 + input.inflation_rate;
            bucket.push(pot);
        }
    }

    let mut p25 = Vec::with_capacity(years);
    let mut p50 = Vec::with_capacity(years);
    let mut p75 = Vec::with_capacity(years);
    for bucket in yearly.iter_mut() {
        p25.push(nearest_rank(bucket, 0.25));
        p50.push(nearest_rank(bucket, 0.50));
        p75.push(nearest_rank(bucket, 0.75));
    }

    AccumulationResult { p25, p50, p75 }
}

/// Nearest-rank percentile: sorts in place and indexes at floor(p * n).
///
/// Slightly biased versus an interpolated estimator, but deterministic and
/// matched exactly by the output-parity tests.
pub fn nearest_rank(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let index = ((p * values.len() as f64).floor() as usize).min(values.len() - 1);
    values[index]
}

pub(crate) fn derive_seed(base_seed: u64, path_id: u32) -> u64 {
    splitmix64(base_seed ^ ((path_id as u64) << 1) ^ 0x6A09_E667_F3BC_C909)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

pub(crate) struct Rng {
    state: u64,
}

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    /// Uniform draw on [-1, 1].
    pub(crate) fn uniform_symmetric(&mut self) -> f64 {
        2.0 * self.next_f64() - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::funds::FundTable;
    use crate::core::types::{DrawdownPolicy, Fund, StatePensionPolicy};
    use proptest::prelude::{prop_assert, proptest};

    fn sample_input() -> PlanInput {
        PlanInput {
            current_age: 30,
            retirement_age: 65,
            salary: 30_000.0,
            current_pot: 10_000.0,
            contribution_rate: 0.10,
            inflation_rate: 0.02,
            accumulation_fund: Fund::FutureAdvantage5,
            decumulation_funds: vec![Fund::FutureAdvantage1],
            age_to_low_risk: 75,
            drawdown: DrawdownPolicy::PotPercentage(4.0),
            state_pension: StatePensionPolicy::None,
            seed: 42,
            paths: DEFAULT_PATHS,
        }
    }

    fn profile_for(input: &PlanInput) -> FundProfile {
        FundTable::default().profile(input.accumulation_fund)
    }

    #[test]
    fn produces_one_data_point_per_year() {
        let input = sample_input();
        let result = run_accumulation(&input, profile_for(&input));
        assert_eq!(result.years(), 35);
        assert_eq!(result.p25.len(), 35);
        assert_eq!(result.p75.len(), 35);
    }

    #[test]
    fn zero_years_yields_empty_sequences() {
        let mut input = sample_input();
        input.retirement_age = input.current_age;
        let result = run_accumulation(&input, profile_for(&input));
        assert!(result.p25.is_empty());
        assert!(result.p50.is_empty());
        assert!(result.p75.is_empty());
        assert_eq!(result.terminal_median(), 0.0);
    }

    #[test]
    fn percentile_bands_stay_ordered_every_year() {
        let input = sample_input();
        let result = run_accumulation(&input, profile_for(&input));
        for year in 0..result.years() {
            assert!(
                result.p25[year] <= result.p50[year] && result.p50[year] <= result.p75[year],
                "band ordering broken at year {year}"
            );
        }
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let input = sample_input();
        let first = run_accumulation(&input, profile_for(&input));
        let second = run_accumulation(&input, profile_for(&input));
        assert_eq!(first.p50, second.p50);
        assert_eq!(first.p25, second.p25);
        assert_eq!(first.p75, second.p75);
    }

    #[test]
    fn zero_volatility_matches_closed_form() {
        let mut input = sample_input();
        input.retirement_age = 33;
        input.inflation_rate = 0.0;
        let profile = FundProfile {
            fund: Fund::FutureAdvantage1,
            mean_return: 0.0,
            volatility: 0.0,
        };

        let result = run_accumulation(&input, profile);
        let contribution = input.salary * input.contribution_rate;
        for (year, value) in result.p50.iter().enumerate() {
            let expected = input.current_pot + contribution * (year as f64 + 1.0);
            assert!(
                (value - expected).abs() <= 1e-6,
                "year {year}: expected {expected}, got {value}"
            );
        }
    }

    #[test]
    fn salary_growth_compounds_after_each_contribution() {
        let mut input = sample_input();
        input.retirement_age = 32;
        input.inflation_rate = 0.10;
        input.current_pot = 0.0;
        let profile = FundProfile {
            fund: Fund::FutureAdvantage1,
            mean_return: 0.0,
            volatility: 0.0,
        };

        let result = run_accumulation(&input, profile);
        let c = input.salary * input.contribution_rate;
        assert!((result.p50[0] - c).abs() <= 1e-6);
        assert!((result.p50[1] - (c + c * 1.10)).abs() <= 1e-6);
    }

    #[test]
    fn nearest_rank_uses_floor_index_not_interpolation() {
        // 1000 deterministic outcomes 1..=1000; the estimator must read the
        // 501st smallest (index 500), never the 500/501 midpoint.
        let mut values: Vec<f64> = (1..=1000).map(f64::from).collect();
        assert_eq!(nearest_rank(&mut values, 0.50), 501.0);
        assert_eq!(nearest_rank(&mut values, 0.25), 251.0);
        assert_eq!(nearest_rank(&mut values, 0.75), 751.0);
    }

    #[test]
    fn nearest_rank_handles_degenerate_samples() {
        assert_eq!(nearest_rank(&mut [], 0.5), 0.0);
        assert_eq!(nearest_rank(&mut [7.0], 0.5), 7.0);
        assert_eq!(nearest_rank(&mut [3.0, 1.0], 1.0), 3.0);
    }

    #[test]
    fn uniform_draws_stay_in_range() {
        let mut rng = Rng::new(9);
        for _ in 0..10_000 {
            let u = rng.uniform_symmetric();
            assert!((-1.0..=1.0).contains(&u));
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_bands_ordered_and_length_matches_years(
            seed in 0u64..10_000,
            current_age in 20u32..60,
            span in 1u32..12,
            salary in 10_000u32..80_000,
            pot in 0u32..200_000,
            paths in 8u32..64
        ) {
            let mut input = sample_input();
            input.seed = seed;
            input.current_age = current_age;
            input.retirement_age = current_age + span;
            input.salary = salary as f64;
            input.current_pot = pot as f64;
            input.paths = paths;

            let result = run_accumulation(&input, profile_for(&input));
            prop_assert!(result.years() == span as usize);
            for year in 0..result.years() {
                prop_assert!(result.p25[year].is_finite());
                prop_assert!(result.p25[year] <= result.p50[year]);
                prop_assert!(result.p50[year] <= result.p75[year]);
            }
        }
    }
}
