mod accumulation;
mod charts;
mod decumulation;
mod funds;
mod types;
mod validate;

pub use accumulation::{DEFAULT_PATHS, run_accumulation};
pub use charts::{ChartData, ChartSeries, ProjectionResult, build_projection, run_projection};
pub use decumulation::run_decumulation;
pub use funds::{FundProfile, FundTable, PlanConfig};
pub use types::{
    AccumulationResult, DecumulationResult, DrawdownPolicy, Fund, PensionSeries, PercentileTriple,
    PlanInput, StatePensionPolicy,
};
pub use validate::{RawPlanInput, ValidationErrors, validate};
