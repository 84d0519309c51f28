//! Output structures for growth simulations

use serde::{Deserialize, Serialize};

use super::state::BalanceState;

/// Final balances of one simulated investment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Principal plus gains already taxed or tax-exempt
    pub taxed_balance: f64,
    /// Unrealized gains not yet taxed
    pub untaxed_balance: f64,
    /// Cumulative absolute fees charged
    pub total_fees_paid: f64,
}

impl SimulationResult {
    /// Value before any final tax
    pub fn gross_value(&self) -> f64 {
        self.taxed_balance + self.untaxed_balance
    }

    /// Value after taxing the remaining unrealized gains once at `tax_rate` percent
    pub fn after_final_tax(&self, tax_rate: f64) -> f64 {
        self.taxed_balance + self.untaxed_balance * (1.0 - tax_rate / 100.0)
    }
}

/// One simulated month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthRow {
    /// Cumulative month index (0-based)
    pub month_index: u32,
    /// Year block (0-based)
    pub year: u32,
    /// Month within the year block (0-based)
    pub month_in_year: u32,
    pub contribution: f64,
    pub interest: f64,
    pub fees: f64,
    /// Balances after contribution, interest and fees
    pub taxed_balance: f64,
    pub untaxed_balance: f64,
}

/// Year-end events of one year block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRow {
    /// Year block (0-based)
    pub year: u32,
    /// Months processed in this block (12, or the remainder for the last block)
    pub months: u32,
    /// Monthly contribution paid during this block
    pub monthly_contribution: f64,
    pub reorganized: bool,
    pub realized_gains: f64,
    pub reorg_tax_paid: f64,
    pub allowance_harvested: f64,
    /// Balances after the year-end events
    pub taxed_balance: f64,
    pub untaxed_balance: f64,
}

/// Complete output of a growth simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub result: SimulationResult,

    /// Monthly rows (only with detailed output)
    pub months: Vec<MonthRow>,

    /// Year-end rows (only with detailed output)
    pub years: Vec<YearRow>,

    summary: ProjectionSummary,
}

impl Projection {
    pub(crate) fn new() -> Self {
        Self {
            result: SimulationResult::default(),
            months: Vec::new(),
            years: Vec::new(),
            summary: ProjectionSummary::default(),
        }
    }

    /// Record final balances and running totals from the end state
    pub(crate) fn finish(mut self, state: &BalanceState) -> Self {
        self.result = SimulationResult {
            taxed_balance: state.taxed_balance,
            untaxed_balance: state.untaxed_balance,
            total_fees_paid: state.total_fees_paid,
        };
        self.summary = ProjectionSummary {
            total_months: state.month_index,
            total_contributions: state.total_contributions,
            total_interest: state.total_interest,
            total_fees: state.total_fees_paid,
            total_reorg_tax: state.total_reorg_tax,
            total_allowance_harvested: state.total_allowance_harvested,
            final_monthly_contribution: state.monthly_contribution,
        };
        self
    }

    /// Totals over the whole run; available with or without detailed output
    pub fn summary(&self) -> &ProjectionSummary {
        &self.summary
    }
}

/// Summary statistics for a growth simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: u32,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub total_fees: f64,
    pub total_reorg_tax: f64,
    pub total_allowance_harvested: f64,
    pub final_monthly_contribution: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_after_final_tax() {
        let result = SimulationResult {
            taxed_balance: 1000.0,
            untaxed_balance: 200.0,
            total_fees_paid: 0.0,
        };
        assert_relative_eq!(result.gross_value(), 1200.0);
        assert_relative_eq!(result.after_final_tax(25.0), 1150.0);
        assert_relative_eq!(result.after_final_tax(0.0), 1200.0);
    }
}
