//! Two-scenario comparison built on the growth engine

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::FeeSchedule;
use crate::error::{Result, SimulationError};
use crate::projection::{
    validate_tax_rate, GrowthEngine, RateModel, SimulationParameters, SimulationResult,
    DEFAULT_REORG_TAX_RATE,
};

/// Fee and tax policy of one scenario. Rates are in percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Gross annual return before percentage fees
    pub gross_annual_rate: f64,
    /// Percentage fees deducted from the gross return (fund fee, wrapper fee)
    pub percentage_fee: f64,
    /// Absolute monthly fees
    pub fee_schedule: FeeSchedule,
    pub reorg_event_count: u32,
    pub reorg_tax_rate: f64,
    pub annual_tax_free_allowance: f64,
    /// Tax applied once to the unrealized gains left at the horizon
    pub final_tax_rate: f64,
}

impl ScenarioConfig {
    /// Scenario without absolute fees, reorganizations or allowance
    pub fn new(gross_annual_rate: f64, percentage_fee: f64, final_tax_rate: f64) -> Self {
        Self {
            gross_annual_rate,
            percentage_fee,
            fee_schedule: FeeSchedule::empty(),
            reorg_event_count: 0,
            reorg_tax_rate: DEFAULT_REORG_TAX_RATE,
            annual_tax_free_allowance: 0.0,
            final_tax_rate,
        }
    }

    pub fn with_fee_schedule(mut self, schedule: FeeSchedule) -> Self {
        self.fee_schedule = schedule;
        self
    }

    pub fn with_reorganizations(mut self, count: u32, tax_rate: f64) -> Self {
        self.reorg_event_count = count;
        self.reorg_tax_rate = tax_rate;
        self
    }

    pub fn with_tax_free_allowance(mut self, allowance: f64) -> Self {
        self.annual_tax_free_allowance = allowance;
        self
    }

    /// Annual growth rate net of percentage fees
    pub fn effective_rate(&self) -> f64 {
        self.gross_annual_rate - self.percentage_fee
    }

    fn to_parameters(&self, inputs: &ComparisonInputs) -> SimulationParameters {
        SimulationParameters::new(
            inputs.monthly_contribution,
            self.effective_rate(),
            inputs.horizon_months,
        )
        .with_contribution_growth(inputs.contribution_growth_rate)
        .with_reorganizations(self.reorg_event_count, self.reorg_tax_rate)
        .with_fee_schedule(self.fee_schedule.clone())
        .with_tax_free_allowance(self.annual_tax_free_allowance)
        .with_rate_model(inputs.rate_model)
    }
}

/// Shared contribution plan plus the two scenario policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInputs {
    pub horizon_months: u32,
    pub monthly_contribution: f64,
    pub contribution_growth_rate: f64,
    pub rate_model: RateModel,
    /// Typically the unwrapped investment
    pub scenario_a: ScenarioConfig,
    /// Typically the wrapped contract; its absolute fees are reported
    pub scenario_b: ScenarioConfig,
}

impl ComparisonInputs {
    /// Simulation parameters of scenario A
    pub fn parameters_a(&self) -> SimulationParameters {
        self.scenario_a.to_parameters(self)
    }

    /// Simulation parameters of scenario B
    pub fn parameters_b(&self) -> SimulationParameters {
        self.scenario_b.to_parameters(self)
    }
}

/// Outcome of a comparison, both worths net of final tax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub final_worth_a: f64,
    pub final_worth_b: f64,
    /// `final_worth_a - final_worth_b`
    pub difference: f64,
    /// `final_worth_a / final_worth_b`
    pub ratio: f64,
    /// Absolute fees paid in scenario B
    pub total_contract_fees: f64,
    pub scenario_a: SimulationResult,
    pub scenario_b: SimulationResult,
}

impl ComparisonResult {
    /// Advantage of A over B in percent of B
    pub fn relative_advantage_pct(&self) -> f64 {
        self.ratio * 100.0 - 100.0
    }
}

/// Simulate both scenarios and tax what is left unrealized at the horizon
pub fn compare(inputs: &ComparisonInputs) -> Result<ComparisonResult> {
    validate_tax_rate("scenario_a.final_tax_rate", inputs.scenario_a.final_tax_rate)?;
    validate_tax_rate("scenario_b.final_tax_rate", inputs.scenario_b.final_tax_rate)?;

    let engine_a = GrowthEngine::new(inputs.parameters_a())?;
    let engine_b = GrowthEngine::new(inputs.parameters_b())?;

    let outcome_a = engine_a.project().result;
    let outcome_b = engine_b.project().result;

    let final_worth_a = outcome_a.after_final_tax(inputs.scenario_a.final_tax_rate);
    let final_worth_b = outcome_b.after_final_tax(inputs.scenario_b.final_tax_rate);

    if final_worth_b == 0.0 {
        return Err(SimulationError::DegenerateComparison {
            worth_b: final_worth_b,
        });
    }

    let result = ComparisonResult {
        final_worth_a,
        final_worth_b,
        difference: final_worth_a - final_worth_b,
        ratio: final_worth_a / final_worth_b,
        total_contract_fees: outcome_b.total_fees_paid,
        scenario_a: outcome_a,
        scenario_b: outcome_b,
    };

    debug!(
        "Compared {} months: A {:.2}, B {:.2}, difference {:.2}",
        inputs.horizon_months, result.final_worth_a, result.final_worth_b, result.difference
    );

    Ok(result)
}
