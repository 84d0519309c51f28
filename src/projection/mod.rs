//! Growth simulator for a single recurring investment

mod state;
mod engine;
mod cashflows;

pub use state::BalanceState;
pub use engine::{
    reorganization_years, simulate, GrowthEngine, RateModel, SimulationParameters,
    DEFAULT_REORG_TAX_RATE,
};
pub(crate) use engine::validate_tax_rate;
pub use cashflows::{MonthRow, Projection, ProjectionSummary, SimulationResult, YearRow};
