use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    PlanConfig, RawPlanInput, ValidationErrors, run_projection, validate,
};

/// A projection request as the browser form submits it: every field a raw
/// string, fund selections as one comma-separated list. Parsing and range
/// checking happen in the core validator, never here.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<String>,
    retirement_age: Option<String>,
    salary: Option<String>,
    current_pot: Option<String>,
    contribution_rate: Option<String>,
    inflation_rate: Option<String>,
    fund: Option<String>,
    funds: Option<String>,
    age_to_low_risk: Option<String>,
    drawdown_type: Option<String>,
    drawdown_value: Option<String>,
    state_pension: Option<String>,
    custom_pension_amount: Option<String>,
    seed: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationErrorResponse {
    field_errors: ValidationErrors,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundDto {
    name: &'static str,
    mean_return: f64,
    volatility: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundsResponse {
    funds: Vec<FundDto>,
    standard_state_pension_annual: f64,
}

/// CLI surface for a one-shot projection. Flags stay raw strings so the
/// conditional-requirement logic lives in the validator alone.
#[derive(Parser, Debug, Default)]
#[command(
    name = "potplan",
    about = "Monte Carlo pension pot projection (accumulation + multi-fund drawdown)"
)]
struct ProjectArgs {
    #[arg(long)]
    current_age: Option<String>,
    #[arg(long)]
    retirement_age: Option<String>,
    #[arg(long, help = "Current annual salary")]
    salary: Option<String>,
    #[arg(long, help = "Current pension pot value")]
    current_pot: Option<String>,
    #[arg(long, help = "Contribution as a percent of salary, e.g. 10")]
    contribution_rate: Option<String>,
    #[arg(long, help = "Expected annual inflation in percent, 0 to 20")]
    inflation_rate: Option<String>,
    #[arg(long, help = "Accumulation fund name, e.g. \"Future Advantage 5\"")]
    fund: Option<String>,
    #[arg(
        long,
        help = "Comma-separated decumulation fund names, lowest risk first (1 to 5)"
    )]
    funds: Option<String>,
    #[arg(long, help = "Age at which all pots consolidate into the first fund")]
    age_to_low_risk: Option<String>,
    #[arg(long, help = "Drawdown policy: percentage, fixed, or initial")]
    drawdown_type: Option<String>,
    #[arg(
        long,
        help = "Drawdown parameter: annual percent for percentage/initial, monthly amount for fixed"
    )]
    drawdown_value: Option<String>,
    #[arg(long, help = "State pension: none, standard, or custom")]
    state_pension: Option<String>,
    #[arg(long, help = "Annual amount when --state-pension=custom")]
    custom_pension_amount: Option<String>,
    #[arg(long, help = "Monte Carlo seed")]
    seed: Option<String>,
}

fn raw_from_payload(payload: &ProjectPayload) -> RawPlanInput {
    RawPlanInput {
        current_age: payload.current_age.clone(),
        retirement_age: payload.retirement_age.clone(),
        salary: payload.salary.clone(),
        current_pot: payload.current_pot.clone(),
        contribution_rate: payload.contribution_rate.clone(),
        inflation_rate: payload.inflation_rate.clone(),
        accumulation_fund: payload.fund.clone(),
        decumulation_funds: split_fund_list(payload.funds.as_deref()),
        age_to_low_risk: payload.age_to_low_risk.clone(),
        drawdown_type: payload.drawdown_type.clone(),
        drawdown_value: payload.drawdown_value.clone(),
        state_pension: payload.state_pension.clone(),
        custom_pension_amount: payload.custom_pension_amount.clone(),
        seed: payload.seed.clone(),
    }
}

fn raw_from_args(args: &ProjectArgs) -> RawPlanInput {
    RawPlanInput {
        current_age: args.current_age.clone(),
        retirement_age: args.retirement_age.clone(),
        salary: args.salary.clone(),
        current_pot: args.current_pot.clone(),
        contribution_rate: args.contribution_rate.clone(),
        inflation_rate: args.inflation_rate.clone(),
        accumulation_fund: args.fund.clone(),
        decumulation_funds: split_fund_list(args.funds.as_deref()),
        age_to_low_risk: args.age_to_low_risk.clone(),
        drawdown_type: args.drawdown_type.clone(),
        drawdown_value: args.drawdown_value.clone(),
        state_pension: args.state_pension.clone(),
        custom_pension_amount: args.custom_pension_amount.clone(),
        seed: args.seed.clone(),
    }
}

/// Splits the comma-separated fund list, preserving blank positions so the
/// validator can report them by index. A wholly blank list means no funds.
fn split_fund_list(raw: Option<&str>) -> Vec<String> {
    match raw.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(list) => list.split(',').map(|name| name.trim().to_string()).collect(),
    }
}

/// Runs one projection from CLI flags, printing the chart-ready JSON to
/// stdout. Returns the process exit code.
pub fn run_cli_projection(args: &[String]) -> i32 {
    let parsed = match ProjectArgs::try_parse_from(args) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return 2;
        }
    };

    let config = PlanConfig::default();
    match validate(&raw_from_args(&parsed), &config) {
        Ok(input) => {
            let result = run_projection(&input, &config);
            match serde_json::to_string_pretty(&result) {
                Ok(json) => {
                    println!("{json}");
                    0
                }
                Err(e) => {
                    eprintln!("Failed to serialize projection: {e}");
                    1
                }
            }
        }
        Err(errors) => {
            eprintln!("Invalid projection request:");
            for (field, message) in &errors {
                eprintln!("  {field}: {message}");
            }
            2
        }
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/funds", get(funds_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("potplan HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let config = PlanConfig::default();
    match validate(&raw_from_payload(&payload), &config) {
        Ok(input) => json_response(StatusCode::OK, run_projection(&input, &config)),
        Err(field_errors) => json_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            ValidationErrorResponse { field_errors },
        ),
    }
}

async fn funds_handler() -> Response {
    let config = PlanConfig::default();
    let funds = config
        .funds
        .profiles()
        .iter()
        .map(|profile| FundDto {
            name: profile.fund.name(),
            mean_return: profile.mean_return,
            volatility: profile.volatility,
        })
        .collect();
    json_response(
        StatusCode::OK,
        FundsResponse {
            funds,
            standard_state_pension_annual: config.standard_state_pension_annual,
        },
    )
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}
