//! Core growth engine: monthly compounding with year-end tax events

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use super::cashflows::{MonthRow, Projection, SimulationResult, YearRow};
use super::state::BalanceState;
use crate::config::FeeSchedule;
use crate::error::{Result, SimulationError};

/// Default tax rate applied when a reorganization realizes gains (percent)
pub const DEFAULT_REORG_TAX_RATE: f64 = 25.0;

/// How a nominal annual rate is turned into a monthly rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RateModel {
    /// `(1 + r/100)^(1/12) - 1`: twelve months compound to exactly the annual rate
    #[default]
    Geometric,
    /// `r/100/12`: simplified variant, compounds to slightly more than the annual rate
    Linear,
}

impl RateModel {
    /// Monthly rate as a fraction for an annual rate in percent
    pub fn monthly_rate(self, annual_rate: f64) -> f64 {
        match self {
            RateModel::Geometric => (1.0 + annual_rate / 100.0).powf(1.0 / 12.0) - 1.0,
            RateModel::Linear => annual_rate / 100.0 / 12.0,
        }
    }
}

/// Inputs of a single growth simulation. Rates are in percent units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Contribution paid in every month (before any growth)
    pub monthly_contribution: f64,

    /// Annual growth of the invested balance, may be negative
    pub annual_growth_rate: f64,

    /// Number of months to simulate
    pub horizon_months: u32,

    /// Yearly growth of the monthly contribution
    pub contribution_growth_rate: f64,

    /// Evenly spaced reorganizations that realize all unrealized gains
    pub reorg_event_count: u32,

    /// Tax rate on gains realized by a reorganization
    pub reorg_tax_rate: f64,

    /// Absolute monthly fees deducted from unrealized gains
    pub fee_schedule: FeeSchedule,

    /// Unrealized gains moved to the taxed bucket each year without tax
    pub annual_tax_free_allowance: f64,

    pub rate_model: RateModel,
}

impl SimulationParameters {
    /// Parameters with no contribution growth, reorganizations, fees or allowance
    pub fn new(monthly_contribution: f64, annual_growth_rate: f64, horizon_months: u32) -> Self {
        Self {
            monthly_contribution,
            annual_growth_rate,
            horizon_months,
            contribution_growth_rate: 0.0,
            reorg_event_count: 0,
            reorg_tax_rate: DEFAULT_REORG_TAX_RATE,
            fee_schedule: FeeSchedule::empty(),
            annual_tax_free_allowance: 0.0,
            rate_model: RateModel::Geometric,
        }
    }

    pub fn with_contribution_growth(mut self, rate: f64) -> Self {
        self.contribution_growth_rate = rate;
        self
    }

    pub fn with_reorganizations(mut self, count: u32, tax_rate: f64) -> Self {
        self.reorg_event_count = count;
        self.reorg_tax_rate = tax_rate;
        self
    }

    pub fn with_fee_schedule(mut self, schedule: FeeSchedule) -> Self {
        self.fee_schedule = schedule;
        self
    }

    pub fn with_tax_free_allowance(mut self, allowance: f64) -> Self {
        self.annual_tax_free_allowance = allowance;
        self
    }

    pub fn with_rate_model(mut self, model: RateModel) -> Self {
        self.rate_model = model;
        self
    }

    /// Check every input before a simulation step runs
    pub fn validate(&self) -> Result<()> {
        if !self.monthly_contribution.is_finite() || self.monthly_contribution < 0.0 {
            return Err(SimulationError::invalid(
                "monthly_contribution",
                format!("{} is not a finite non-negative amount", self.monthly_contribution),
            ));
        }
        if !self.annual_growth_rate.is_finite() {
            return Err(SimulationError::invalid(
                "annual_growth_rate",
                format!("{} is not finite", self.annual_growth_rate),
            ));
        }
        if self.rate_model == RateModel::Geometric && self.annual_growth_rate <= -100.0 {
            return Err(SimulationError::invalid(
                "annual_growth_rate",
                format!(
                    "{}% has no monthly compounding equivalent, must be above -100%",
                    self.annual_growth_rate
                ),
            ));
        }
        if !self.contribution_growth_rate.is_finite() || self.contribution_growth_rate < 0.0 {
            return Err(SimulationError::invalid(
                "contribution_growth_rate",
                format!("{} is not a finite non-negative rate", self.contribution_growth_rate),
            ));
        }
        validate_tax_rate("reorg_tax_rate", self.reorg_tax_rate)?;
        if !self.annual_tax_free_allowance.is_finite() || self.annual_tax_free_allowance < 0.0 {
            return Err(SimulationError::invalid(
                "annual_tax_free_allowance",
                format!("{} is not a finite non-negative amount", self.annual_tax_free_allowance),
            ));
        }
        self.fee_schedule.validate()
    }
}

/// Tax rates are percentages within `[0, 100]`
pub(crate) fn validate_tax_rate(field: &'static str, rate: f64) -> Result<()> {
    if rate.is_finite() && (0.0..=100.0).contains(&rate) {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            field,
            format!("{} is outside 0..=100 percent", rate),
        ))
    }
}

/// Year indices at which reorganizations happen.
///
/// `event_count` interior points of an even split of `0..=full_years`,
/// truncated to whole years, endpoints excluded. Several points may land
/// on the same year when events outnumber years.
pub fn reorganization_years(full_years: u32, event_count: u32) -> Vec<u32> {
    if event_count == 0 {
        return Vec::new();
    }
    let step = full_years as f64 / (event_count as f64 + 1.0);
    (1..=event_count)
        .map(|i| (i as f64 * step) as u32)
        .collect()
}

/// Growth engine for a single investment
#[derive(Debug, Clone)]
pub struct GrowthEngine {
    params: SimulationParameters,
    detailed_output: bool,
}

impl GrowthEngine {
    /// Validate parameters and create an engine
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            detailed_output: false,
        })
    }

    /// Record a row per month and per year in the projection
    pub fn with_detailed_output(mut self, detailed_output: bool) -> Self {
        self.detailed_output = detailed_output;
        self
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Run the simulation month by month
    pub fn project(&self) -> Projection {
        let params = &self.params;
        let monthly_rate = params.rate_model.monthly_rate(params.annual_growth_rate);
        let full_years = params.horizon_months / 12;
        let remainder_months = params.horizon_months % 12;
        let reorg_years = reorganization_years(full_years, params.reorg_event_count);

        let mut state = BalanceState::new(params.monthly_contribution);
        let mut projection = Projection::new();

        for year in 0..=full_years {
            let months = if year == full_years {
                if remainder_months == 0 {
                    break;
                }
                remainder_months
            } else {
                12
            };

            // Applied before the first contribution of every block, year 0 included
            if params.contribution_growth_rate > 0.0 {
                state.grow_contribution(params.contribution_growth_rate);
            }

            for month_in_year in 0..months {
                let contribution = state.contribute();
                let interest = state.accrue_interest(monthly_rate);
                let fees = state.charge_fees(&params.fee_schedule, params.horizon_months);

                if self.detailed_output {
                    projection.months.push(MonthRow {
                        month_index: state.month_index,
                        year,
                        month_in_year,
                        contribution,
                        interest,
                        fees,
                        taxed_balance: state.taxed_balance,
                        untaxed_balance: state.untaxed_balance,
                    });
                }

                state.advance_month();
            }

            let mut row = YearRow {
                year,
                months,
                monthly_contribution: state.monthly_contribution,
                reorganized: false,
                realized_gains: 0.0,
                reorg_tax_paid: 0.0,
                allowance_harvested: 0.0,
                taxed_balance: 0.0,
                untaxed_balance: 0.0,
            };

            if params.reorg_event_count > 0 && reorg_years.contains(&year) {
                let (realized, tax) = state.realize_gains(params.reorg_tax_rate);
                debug!(
                    "Reorganization in year {}: realized {:.2}, tax {:.2}",
                    year, realized, tax
                );
                row.reorganized = true;
                row.realized_gains = realized;
                row.reorg_tax_paid = tax;
            }

            if params.annual_tax_free_allowance > 0.0 {
                let harvested = state.harvest_allowance(params.annual_tax_free_allowance);
                debug!("Allowance in year {}: moved {:.2} tax-free", year, harvested);
                row.allowance_harvested = harvested;
            }

            if self.detailed_output {
                row.taxed_balance = state.taxed_balance;
                row.untaxed_balance = state.untaxed_balance;
                projection.years.push(row);
            }
        }

        debug!(
            "Simulated {} months at {}% ({:?}): taxed {:.2}, untaxed {:.2}, fees {:.2}",
            state.month_index,
            params.annual_growth_rate,
            params.rate_model,
            state.taxed_balance,
            state.untaxed_balance,
            state.total_fees_paid
        );

        projection.finish(&state)
    }
}

/// Validate and simulate, returning only the final balances
pub fn simulate(params: &SimulationParameters) -> Result<SimulationResult> {
    let engine = GrowthEngine::new(params.clone())?;
    Ok(engine.project().result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn detailed(params: SimulationParameters) -> Projection {
        GrowthEngine::new(params)
            .unwrap()
            .with_detailed_output(true)
            .project()
    }

    #[test]
    fn test_zero_horizon_is_all_zero() {
        let params = SimulationParameters::new(150.0, 7.0, 0)
            .with_fee_schedule(FeeSchedule::default_contract())
            .with_tax_free_allowance(1000.0)
            .with_reorganizations(3, 25.0);
        let result = simulate(&params).unwrap();
        assert_eq!(result, SimulationResult::default());
    }

    #[test]
    fn test_reference_thirty_months() {
        let result = simulate(&SimulationParameters::new(150.0, 7.0, 30)).unwrap();
        assert_relative_eq!(result.taxed_balance, 4500.0);
        assert_relative_eq!(result.untaxed_balance, 416.8118207212509, max_relative = 1e-12);
        assert_eq!(result.total_fees_paid, 0.0);
    }

    #[test]
    fn test_reference_thirty_months_linear() {
        let params = SimulationParameters::new(150.0, 7.0, 30).with_rate_model(RateModel::Linear);
        let result = simulate(&params).unwrap();
        assert_relative_eq!(result.taxed_balance, 4500.0);
        assert_relative_eq!(result.untaxed_balance, 430.7853502021497, max_relative = 1e-12);
    }

    #[test]
    fn test_reference_all_features() {
        let params = SimulationParameters::new(200.0, 7.5, 20 * 12)
            .with_contribution_growth(2.0)
            .with_reorganizations(3, 20.0)
            .with_fee_schedule(FeeSchedule::from_pairs(&[(60, 30.0), (120, 20.0)]))
            .with_tax_free_allowance(1000.0);
        let result = simulate(&params).unwrap();
        assert_relative_eq!(result.taxed_balance, 86678.40316378113, max_relative = 1e-10);
        assert_relative_eq!(result.untaxed_balance, 21320.56750390328, max_relative = 1e-10);
        assert_relative_eq!(result.total_fees_paid, 4250.0, max_relative = 1e-12);
    }

    #[test]
    fn test_geometric_rate_compounds_to_annual() {
        let monthly = RateModel::Geometric.monthly_rate(7.0);
        assert_relative_eq!((1.0 + monthly).powi(12), 1.07, max_relative = 1e-12);
        assert_relative_eq!(RateModel::Linear.monthly_rate(6.0), 0.005);
    }

    #[test]
    fn test_reorganization_years() {
        assert_eq!(reorganization_years(33, 2), vec![11, 22]);
        assert_eq!(reorganization_years(10, 2), vec![3, 6]);
        assert_eq!(reorganization_years(20, 3), vec![5, 10, 15]);
        assert!(reorganization_years(20, 0).is_empty());

        // More events than years: repeats, starting at year 0
        let crowded = reorganization_years(3, 30);
        assert_eq!(crowded.len(), 30);
        assert_eq!(crowded[0], 0);
        assert!(crowded.iter().all(|&y| y < 3));
    }

    #[test]
    fn test_partial_final_year_never_reorganizes() {
        // 2 full years + 6 months, one event lands in year 1
        let params = SimulationParameters::new(100.0, 5.0, 30).with_reorganizations(1, 25.0);
        let projection = detailed(params);

        let reorganized: Vec<u32> = projection
            .years
            .iter()
            .filter(|y| y.reorganized)
            .map(|y| y.year)
            .collect();
        assert_eq!(reorganized, vec![1]);
        assert_eq!(projection.years.len(), 3);
        assert_eq!(projection.years[2].months, 6);
    }

    #[test]
    fn test_contribution_growth_applies_in_first_year() {
        let params = SimulationParameters::new(100.0, 0.0, 24).with_contribution_growth(10.0);
        let projection = detailed(params);

        assert_relative_eq!(projection.months[0].contribution, 110.0, max_relative = 1e-12);
        assert_relative_eq!(projection.months[12].contribution, 121.0, max_relative = 1e-12);
        assert_relative_eq!(
            projection.result.taxed_balance,
            12.0 * 110.0 + 12.0 * 121.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            projection.summary().final_monthly_contribution,
            121.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_fee_threshold_inclusive_boundary() {
        let params = SimulationParameters::new(100.0, 5.0, 36)
            .with_fee_schedule(FeeSchedule::from_pairs(&[(14, 7.5)]));
        let projection = detailed(params);

        assert_eq!(projection.months[14].month_index, 14);
        assert_relative_eq!(projection.months[14].fees, 7.5);
        assert_eq!(projection.months[15].fees, 0.0);
        assert_relative_eq!(projection.result.total_fees_paid, 15.0 * 7.5);
    }

    #[test]
    fn test_fees_can_push_untaxed_negative() {
        let params = SimulationParameters::new(100.0, 0.0, 3)
            .with_fee_schedule(FeeSchedule::from_pairs(&[(100, 10.0)]));
        let result = simulate(&params).unwrap();
        assert_relative_eq!(result.untaxed_balance, -30.0);
        assert_relative_eq!(result.taxed_balance, 300.0);
    }

    #[test]
    fn test_reorganization_taxes_gains() {
        let plain = simulate(&SimulationParameters::new(150.0, 7.0, 120)).unwrap();
        let taxed = GrowthEngine::new(
            SimulationParameters::new(150.0, 7.0, 120).with_reorganizations(1, 25.0),
        )
        .unwrap()
        .project();

        assert!(taxed.summary().total_reorg_tax > 0.0);
        assert!(taxed.result.gross_value() < plain.gross_value());
    }

    #[test]
    fn test_negative_growth_is_allowed() {
        let result = simulate(&SimulationParameters::new(100.0, -20.0, 24)).unwrap();
        assert!(result.untaxed_balance < 0.0);
        assert_relative_eq!(result.taxed_balance, 2400.0);
    }

    #[test]
    fn test_overflow_propagates_as_value() {
        let result = simulate(&SimulationParameters::new(1e300, 1e6, 1200)).unwrap();
        assert!(result.untaxed_balance.is_infinite());
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        let cases = [
            (SimulationParameters::new(-1.0, 7.0, 12), "monthly_contribution"),
            (SimulationParameters::new(f64::NAN, 7.0, 12), "monthly_contribution"),
            (SimulationParameters::new(100.0, -100.0, 12), "annual_growth_rate"),
            (
                SimulationParameters::new(100.0, 7.0, 12).with_contribution_growth(-1.0),
                "contribution_growth_rate",
            ),
            (
                SimulationParameters::new(100.0, 7.0, 12).with_reorganizations(2, 120.0),
                "reorg_tax_rate",
            ),
            (
                SimulationParameters::new(100.0, 7.0, 12).with_tax_free_allowance(-5.0),
                "annual_tax_free_allowance",
            ),
            (
                SimulationParameters::new(100.0, 7.0, 12)
                    .with_fee_schedule(FeeSchedule::from_pairs(&[(12, f64::INFINITY)])),
                "fee_schedule",
            ),
        ];

        for (params, expected) in cases {
            match simulate(&params) {
                Err(SimulationError::InvalidParameter { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_linear_model_accepts_rate_below_minus_hundred() {
        let params = SimulationParameters::new(100.0, -150.0, 12).with_rate_model(RateModel::Linear);
        assert!(simulate(&params).is_ok());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_total_non_decreasing_without_fees(
            contribution in 1u32..5_000,
            rate_bp in 0u32..2_000,
            horizon in 1u32..600
        ) {
            let params = SimulationParameters::new(contribution as f64, rate_bp as f64 / 100.0, horizon);
            let projection = detailed(params);

            prop_assert_eq!(projection.months.len(), horizon as usize);
            let mut previous = 0.0;
            for row in &projection.months {
                let total = row.taxed_balance + row.untaxed_balance;
                prop_assert!(total >= previous);
                previous = total;
            }
        }

        #[test]
        fn prop_tax_free_reorganization_only_relabels(
            contribution in 1u32..2_000,
            rate_bp in -500i32..1_500,
            horizon in 0u32..720,
            events in 1u32..12
        ) {
            let base = SimulationParameters::new(contribution as f64, rate_bp as f64 / 100.0, horizon);
            let plain = simulate(&base).unwrap();
            let relabeled = simulate(&base.clone().with_reorganizations(events, 0.0)).unwrap();

            assert_relative_eq!(relabeled.gross_value(), plain.gross_value(), max_relative = 1e-9);
            prop_assert!(relabeled.untaxed_balance.abs() <= plain.untaxed_balance.abs() + 1e-6);
        }

        #[test]
        fn prop_allowance_moves_without_loss(
            contribution in 1u32..2_000,
            rate_bp in 0u32..1_500,
            horizon in 0u32..720,
            allowance in 1u32..5_000
        ) {
            let base = SimulationParameters::new(contribution as f64, rate_bp as f64 / 100.0, horizon);
            let plain = simulate(&base).unwrap();
            let projection = GrowthEngine::new(base.clone().with_tax_free_allowance(allowance as f64))
                .unwrap()
                .with_detailed_output(true)
                .project();

            assert_relative_eq!(projection.result.gross_value(), plain.gross_value(), max_relative = 1e-9);
            for year in &projection.years {
                prop_assert!(year.allowance_harvested <= allowance as f64);
            }
            assert_abs_diff_eq!(
                projection.result.taxed_balance,
                plain.taxed_balance + projection.summary().total_allowance_harvested,
                epsilon = 1e-6 * (1.0 + plain.taxed_balance)
            );
        }

        #[test]
        fn prop_fee_total_matches_schedule(
            thresholds in proptest::collection::vec(0u32..400, 0..4),
            fee_cents in 0u32..10_000,
            horizon in 0u32..480
        ) {
            let pairs: Vec<(u32, f64)> = thresholds
                .iter()
                .enumerate()
                .map(|(i, &t)| (t, (fee_cents + i as u32 * 100) as f64 / 100.0))
                .collect();
            let schedule = FeeSchedule::from_pairs(&pairs);
            let params = SimulationParameters::new(100.0, 5.0, horizon).with_fee_schedule(schedule.clone());
            let result = simulate(&params).unwrap();

            let expected: f64 = (0..horizon).map(|m| schedule.fee_for_month(m, horizon)).sum();
            assert_relative_eq!(result.total_fees_paid, expected, max_relative = 1e-9, epsilon = 1e-9);
            assert_relative_eq!(result.total_fees_paid, schedule.total_over(horizon), max_relative = 1e-9, epsilon = 1e-9);
        }
    }
}
