use serde::Serialize;

use super::accumulation::run_accumulation;
use super::decumulation::run_decumulation;
use super::funds::PlanConfig;
use super::types::{
    AccumulationResult, DecumulationResult, PercentileTriple, PlanInput,
};

/// One named line on a chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<f64>,
}

/// A chart-ready dataset: age labels on the x axis, one or more value series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub ages: Vec<u32>,
    pub series: Vec<ChartSeries>,
}

/// Everything a caller needs to render the projection: four chart datasets
/// and the final percentile summary, returned as one value per run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub current_age: u32,
    pub retirement_age: u32,
    pub accumulation: ChartData,
    pub fund_balances: ChartData,
    pub monthly_income: ChartData,
    pub annual_income: ChartData,
    pub summary: PercentileTriple,
}

/// The single core entry point: accumulation feeds its median terminal pot
/// into decumulation, and both traces are folded into chart data.
pub fn run_projection(input: &PlanInput, config: &PlanConfig) -> ProjectionResult {
    let profile = config.funds.profile(input.accumulation_fund);
    let accumulation = run_accumulation(input, profile);
    let decumulation = run_decumulation(input, config, accumulation.terminal_median());
    build_projection(input, &accumulation, &decumulation)
}

/// Pure aggregation of the two simulator outputs into labeled series.
pub fn build_projection(
    input: &PlanInput,
    accumulation: &AccumulationResult,
    decumulation: &DecumulationResult,
) -> ProjectionResult {
    let summary = accumulation.terminal();

    let accumulation_chart = ChartData {
        ages: yearly_ages(input.current_age, accumulation.years()),
        series: vec![
            series("25th percentile", accumulation.p25.clone()),
            series("Median", accumulation.p50.clone()),
            series("75th percentile", accumulation.p75.clone()),
        ],
    };

    let monthly_ages = monthly_ages(input.retirement_age, decumulation.months());
    let fund_balances = ChartData {
        ages: monthly_ages.clone(),
        series: decumulation
            .fund_balances
            .iter()
            .enumerate()
            .map(|(index, values)| {
                let name = input
                    .decumulation_funds
                    .get(index)
                    .map(|fund| fund.name())
                    .unwrap_or("Unassigned");
                series(&format!("Pot {}: {name}", index + 1), values.clone())
            })
            .collect(),
    };

    let mut monthly_income_series =
        vec![series("Drawdown", decumulation.monthly_withdrawals.clone())];
    let mut annual_income_series =
        vec![series("Drawdown", decumulation.annual_withdrawals.clone())];
    if let Some(pension) = &decumulation.state_pension {
        monthly_income_series.push(series("State pension", pension.monthly.clone()));
        annual_income_series.push(series("State pension", pension.annual.clone()));
    }

    let monthly_income = ChartData {
        ages: monthly_ages,
        series: monthly_income_series,
    };
    let annual_income = ChartData {
        ages: yearly_ages(input.retirement_age, decumulation.annual_withdrawals.len()),
        series: annual_income_series,
    };

    ProjectionResult {
        current_age: input.current_age,
        retirement_age: input.retirement_age,
        accumulation: accumulation_chart,
        fund_balances,
        monthly_income,
        annual_income,
        summary,
    }
}

fn series(label: &str, values: Vec<f64>) -> ChartSeries {
    ChartSeries {
        label: label.to_string(),
        values,
    }
}

fn yearly_ages(base_age: u32, count: usize) -> Vec<u32> {
    (0..count).map(|index| base_age + index as u32).collect()
}

fn monthly_ages(base_age: u32, count: usize) -> Vec<u32> {
    (0..count)
        .map(|index| base_age + (index / 12) as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DrawdownPolicy, Fund, StatePensionPolicy};

    fn sample_input() -> PlanInput {
        PlanInput {
            current_age: 30,
            retirement_age: 65,
            salary: 30_000.0,
            current_pot: 10_000.0,
            contribution_rate: 0.10,
            inflation_rate: 0.02,
            accumulation_fund: Fund::FutureAdvantage5,
            decumulation_funds: vec![
                Fund::FutureAdvantage1,
                Fund::FutureAdvantage3,
                Fund::FutureAdvantage5,
            ],
            age_to_low_risk: 75,
            drawdown: DrawdownPolicy::PotPercentage(4.0),
            state_pension: StatePensionPolicy::None,
            seed: 42,
            paths: 1000,
        }
    }

    #[test]
    fn yearly_labels_are_base_plus_index() {
        assert_eq!(yearly_ages(30, 4), vec![30, 31, 32, 33]);
        assert!(yearly_ages(30, 0).is_empty());
    }

    #[test]
    fn monthly_labels_advance_every_twelve_entries() {
        let ages = monthly_ages(65, 25);
        assert_eq!(ages[0], 65);
        assert_eq!(ages[11], 65);
        assert_eq!(ages[12], 66);
        assert_eq!(ages[24], 67);
    }

    #[test]
    fn full_projection_scenario_thirty_to_sixty_five() {
        let input = sample_input();
        let result = run_projection(&input, &PlanConfig::default());

        // 35 accumulation years with ordered bands at every point.
        assert_eq!(result.accumulation.ages.len(), 35);
        let p25 = &result.accumulation.series[0].values;
        let p50 = &result.accumulation.series[1].values;
        let p75 = &result.accumulation.series[2].values;
        assert_eq!(p50.len(), 35);
        for year in 0..35 {
            assert!(p25[year] <= p50[year] && p50[year] <= p75[year]);
        }

        // Decumulation runs at most (100 - 65) * 12 months and exposes one
        // balance series per chosen pot.
        let months = result.monthly_income.series[0].values.len();
        assert!(months >= 1 && months <= 420);
        assert_eq!(result.fund_balances.series.len(), 3);
        for series in &result.fund_balances.series {
            assert_eq!(series.values.len(), months);
        }
        assert_eq!(result.fund_balances.ages.len(), months);

        // Summary mirrors the final accumulation year.
        assert_eq!(result.summary.p50, p50[34]);
        assert!(result.summary.p25 <= result.summary.p50);
        assert!(result.summary.p50 <= result.summary.p75);
    }

    #[test]
    fn pension_series_appear_in_both_income_charts() {
        let mut input = sample_input();
        input.state_pension = StatePensionPolicy::Standard;
        let result = run_projection(&input, &PlanConfig::default());

        assert_eq!(result.monthly_income.series.len(), 2);
        assert_eq!(result.annual_income.series.len(), 2);
        assert_eq!(result.monthly_income.series[1].label, "State pension");
        assert_eq!(
            result.annual_income.series[0].values.len(),
            result.annual_income.series[1].values.len()
        );
    }

    #[test]
    fn degenerate_start_still_produces_renderable_charts() {
        // Retirement in one year with no money at all: the accumulation
        // median can be ~0 and decumulation degenerates, but every chart
        // stays well formed.
        let mut input = sample_input();
        input.current_pot = 0.0;
        input.salary = 0.0;
        input.retirement_age = 31;

        let result = run_projection(&input, &PlanConfig::default());
        assert_eq!(result.accumulation.ages.len(), 1);
        assert_eq!(result.fund_balances.series.len(), 3);
        assert!(!result.monthly_income.series[0].values.is_empty());
        assert_eq!(result.annual_income.series[0].values.len(), 1);
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let input = sample_input();
        let result = run_projection(&input, &PlanConfig::default());
        let json = serde_json::to_string(&result).expect("projection serializes");
        assert!(json.contains("\"currentAge\""));
        assert!(json.contains("\"retirementAge\""));
        assert!(json.contains("\"fundBalances\""));
        assert!(json.contains("\"monthlyIncome\""));
        assert!(json.contains("\"annualIncome\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"ages\""));
    }
}
