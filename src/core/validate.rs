use std::collections::BTreeMap;

use super::accumulation::DEFAULT_PATHS;
use super::funds::PlanConfig;
use super::types::{DrawdownPolicy, Fund, PlanInput, StatePensionPolicy};

/// Field name -> human-readable message, ordered for stable reporting.
pub type ValidationErrors = BTreeMap<String, String>;

/// A projection request exactly as a form submits it: raw strings, possibly
/// empty or non-numeric. Fund selections are an ordered list indexed by
/// position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlanInput {
    pub current_age: Option<String>,
    pub retirement_age: Option<String>,
    pub salary: Option<String>,
    pub current_pot: Option<String>,
    pub contribution_rate: Option<String>,
    pub inflation_rate: Option<String>,
    pub accumulation_fund: Option<String>,
    pub decumulation_funds: Vec<String>,
    pub age_to_low_risk: Option<String>,
    pub drawdown_type: Option<String>,
    pub drawdown_value: Option<String>,
    pub state_pension: Option<String>,
    pub custom_pension_amount: Option<String>,
    pub seed: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DrawdownKind {
    Percentage,
    Fixed,
    Initial,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PensionKind {
    None,
    Standard,
    Custom,
}

/// Validates a raw form submission in two stages: presence/parseability
/// first, then range and cross-field checks. Stage two only runs when stage
/// one produced no errors, so range messages never compound onto fields that
/// failed to parse. Pure function; identical input gives identical output.
pub fn validate(raw: &RawPlanInput, config: &PlanConfig) -> Result<PlanInput, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let current_age = parse_age(&mut errors, &raw.current_age, "currentAge", "Current age");
    let retirement_age = parse_age(
        &mut errors,
        &raw.retirement_age,
        "retirementAge",
        "Retirement age",
    );
    let salary = parse_amount(&mut errors, &raw.salary, "salary", "Salary");
    let current_pot = parse_amount(&mut errors, &raw.current_pot, "currentPot", "Current pot");
    let contribution_rate = parse_amount(
        &mut errors,
        &raw.contribution_rate,
        "contributionRate",
        "Contribution rate",
    );
    let inflation_rate = parse_amount(
        &mut errors,
        &raw.inflation_rate,
        "inflationRate",
        "Inflation rate",
    );
    let age_to_low_risk = parse_age(
        &mut errors,
        &raw.age_to_low_risk,
        "ageToLowRisk",
        "Age to switch to the low-risk fund",
    );

    let accumulation_fund = parse_fund(&mut errors, &raw.accumulation_fund, config);

    let mut decumulation_funds = Vec::with_capacity(raw.decumulation_funds.len());
    if raw.decumulation_funds.is_empty() {
        errors.insert(
            "funds".to_string(),
            "Select at least one decumulation fund".to_string(),
        );
    }
    for (index, name) in raw.decumulation_funds.iter().enumerate() {
        let field = format!("funds[{index}]");
        let trimmed = name.trim();
        if trimmed.is_empty() {
            errors.insert(field, format!("Decumulation fund {} is required", index + 1));
        } else if let Some(fund) = lookup_fund(config, trimmed) {
            decumulation_funds.push(fund);
        } else {
            errors.insert(field, format!("Unknown fund \"{trimmed}\""));
        }
    }

    let drawdown_kind = match raw.drawdown_type.as_deref().map(str::trim) {
        Some("percentage") => Some(DrawdownKind::Percentage),
        Some("fixed") => Some(DrawdownKind::Fixed),
        Some("initial") => Some(DrawdownKind::Initial),
        Some(other) if !other.is_empty() => {
            errors.insert(
                "drawdownType".to_string(),
                format!("Unknown drawdown type \"{other}\""),
            );
            None
        }
        _ => {
            errors.insert(
                "drawdownType".to_string(),
                "Drawdown type is required".to_string(),
            );
            None
        }
    };
    // The parameter is conditionally required: it belongs to whichever
    // drawdown policy was selected.
    let drawdown_value = match drawdown_kind {
        Some(DrawdownKind::Percentage) => parse_amount(
            &mut errors,
            &raw.drawdown_value,
            "drawdownValue",
            "Drawdown percentage",
        ),
        Some(DrawdownKind::Fixed) => parse_amount(
            &mut errors,
            &raw.drawdown_value,
            "drawdownValue",
            "Monthly drawdown amount",
        ),
        Some(DrawdownKind::Initial) => parse_amount(
            &mut errors,
            &raw.drawdown_value,
            "drawdownValue",
            "Initial pot drawdown percentage",
        ),
        None => None,
    };

    let pension_kind = match raw.state_pension.as_deref().map(str::trim) {
        None | Some("") | Some("none") => Some(PensionKind::None),
        Some("standard") => Some(PensionKind::Standard),
        Some("custom") => Some(PensionKind::Custom),
        Some(other) => {
            errors.insert(
                "statePension".to_string(),
                format!("Unknown state pension option \"{other}\""),
            );
            None
        }
    };
    let custom_pension_amount = if pension_kind == Some(PensionKind::Custom) {
        parse_amount(
            &mut errors,
            &raw.custom_pension_amount,
            "customPensionAmount",
            "Custom state pension amount",
        )
    } else {
        None
    };

    let seed = match raw.seed.as_deref().map(str::trim) {
        None | Some("") => Some(42),
        Some(text) => match text.parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.insert("seed".to_string(), "Seed must be a whole number".to_string());
                None
            }
        },
    };

    // Stage one failed: report parse errors alone, never range checks
    // against fields that did not parse.
    if !errors.is_empty() {
        return Err(errors);
    }

    let current_age = current_age.unwrap_or_default();
    let retirement_age = retirement_age.unwrap_or_default();
    let salary = salary.unwrap_or_default();
    let current_pot = current_pot.unwrap_or_default();
    let contribution_rate = contribution_rate.unwrap_or_default();
    let inflation_rate = inflation_rate.unwrap_or_default();
    let age_to_low_risk = age_to_low_risk.unwrap_or_default();
    let drawdown_kind = drawdown_kind.unwrap_or(DrawdownKind::Percentage);
    let drawdown_value = drawdown_value.unwrap_or_default();
    let pension_kind = pension_kind.unwrap_or(PensionKind::None);

    if current_age == 0 {
        errors.insert(
            "currentAge".to_string(),
            "Current age must be greater than 0".to_string(),
        );
    }
    if retirement_age <= current_age {
        errors.insert(
            "retirementAge".to_string(),
            "Retirement age must be greater than current age".to_string(),
        );
    }
    if salary < 0.0 {
        errors.insert("salary".to_string(), "Salary cannot be negative".to_string());
    }
    if current_pot < 0.0 {
        errors.insert(
            "currentPot".to_string(),
            "Current pot cannot be negative".to_string(),
        );
    }
    if !(contribution_rate > 0.0 && contribution_rate <= 100.0) {
        errors.insert(
            "contributionRate".to_string(),
            "Contribution rate must be between 0 and 100".to_string(),
        );
    }
    if !(0.0..=20.0).contains(&inflation_rate) {
        errors.insert(
            "inflationRate".to_string(),
            "Inflation rate must be between 0 and 20".to_string(),
        );
    }
    if age_to_low_risk < retirement_age {
        errors.insert(
            "ageToLowRisk".to_string(),
            "Low-risk switch age cannot be before retirement age".to_string(),
        );
    }
    if decumulation_funds.len() > 5 {
        errors.insert(
            "funds".to_string(),
            "Choose between 1 and 5 decumulation funds".to_string(),
        );
    }
    match drawdown_kind {
        DrawdownKind::Percentage | DrawdownKind::Initial => {
            if !(drawdown_value > 0.0 && drawdown_value <= 100.0) {
                errors.insert(
                    "drawdownValue".to_string(),
                    "Drawdown percentage must be between 0 and 100".to_string(),
                );
            }
        }
        DrawdownKind::Fixed => {
            if drawdown_value <= 0.0 {
                errors.insert(
                    "drawdownValue".to_string(),
                    "Monthly drawdown amount must be greater than 0".to_string(),
                );
            }
        }
    }
    if pension_kind == PensionKind::Custom && custom_pension_amount.unwrap_or_default() <= 0.0 {
        errors.insert(
            "customPensionAmount".to_string(),
            "Custom state pension amount must be greater than 0".to_string(),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let drawdown = match drawdown_kind {
        DrawdownKind::Percentage => DrawdownPolicy::PotPercentage(drawdown_value),
        DrawdownKind::Fixed => DrawdownPolicy::FixedMonthly(drawdown_value),
        DrawdownKind::Initial => DrawdownPolicy::InitialPotPercentage(drawdown_value),
    };
    let state_pension = match pension_kind {
        PensionKind::None => StatePensionPolicy::None,
        PensionKind::Standard => StatePensionPolicy::Standard,
        PensionKind::Custom => {
            StatePensionPolicy::Custom(custom_pension_amount.unwrap_or_default())
        }
    };

    Ok(PlanInput {
        current_age,
        retirement_age,
        salary,
        current_pot,
        contribution_rate: contribution_rate / 100.0,
        inflation_rate: inflation_rate / 100.0,
        accumulation_fund: accumulation_fund.unwrap_or(Fund::FutureAdvantage1),
        decumulation_funds,
        age_to_low_risk,
        drawdown,
        state_pension,
        seed: seed.unwrap_or(42),
        paths: DEFAULT_PATHS,
    })
}

fn parse_age(
    errors: &mut ValidationErrors,
    raw: &Option<String>,
    field: &str,
    label: &str,
) -> Option<u32> {
    let text = raw.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        errors.insert(field.to_string(), format!("{label} is required"));
        return None;
    }
    match text.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field.to_string(), format!("{label} must be a whole number"));
            None
        }
    }
}

fn parse_amount(
    errors: &mut ValidationErrors,
    raw: &Option<String>,
    field: &str,
    label: &str,
) -> Option<f64> {
    let text = raw.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        errors.insert(field.to_string(), format!("{label} is required"));
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.insert(field.to_string(), format!("{label} must be a number"));
            None
        }
    }
}

fn parse_fund(
    errors: &mut ValidationErrors,
    raw: &Option<String>,
    config: &PlanConfig,
) -> Option<Fund> {
    let text = raw.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        errors.insert(
            "fund".to_string(),
            "Accumulation fund is required".to_string(),
        );
        return None;
    }
    match lookup_fund(config, text) {
        Some(fund) => Some(fund),
        None => {
            errors.insert("fund".to_string(), format!("Unknown fund \"{text}\""));
            None
        }
    }
}

fn lookup_fund(config: &PlanConfig, name: &str) -> Option<Fund> {
    config
        .funds
        .profiles()
        .iter()
        .map(|profile| profile.fund)
        .find(|fund| fund.name() == name)
}
