//! Balance state of a single investment during a growth simulation

use crate::config::FeeSchedule;

/// Two-bucket balance of an investment at a point in the simulation
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// Number of months fully simulated so far; also the cumulative
    /// 0-based index of the month currently being processed
    pub month_index: u32,

    /// Current monthly contribution (grows with the contribution rate)
    pub monthly_contribution: f64,

    /// Principal plus gains already taxed or tax-exempt
    pub taxed_balance: f64,

    /// Unrealized gains accrued since the last taxation event
    pub untaxed_balance: f64,

    /// Cumulative absolute fees charged
    pub total_fees_paid: f64,

    /// Cumulative contributions paid in
    pub total_contributions: f64,

    /// Cumulative interest credited
    pub total_interest: f64,

    /// Cumulative tax paid on reorganizations
    pub total_reorg_tax: f64,

    /// Cumulative gains moved under the tax-free allowance
    pub total_allowance_harvested: f64,
}

impl BalanceState {
    /// Fresh state with empty balances
    pub fn new(monthly_contribution: f64) -> Self {
        Self {
            month_index: 0,
            monthly_contribution,
            taxed_balance: 0.0,
            untaxed_balance: 0.0,
            total_fees_paid: 0.0,
            total_contributions: 0.0,
            total_interest: 0.0,
            total_reorg_tax: 0.0,
            total_allowance_harvested: 0.0,
        }
    }

    /// Combined value of both buckets
    pub fn total_balance(&self) -> f64 {
        self.taxed_balance + self.untaxed_balance
    }

    /// Scale the contribution by one year of growth (percent)
    pub fn grow_contribution(&mut self, growth_rate: f64) {
        self.monthly_contribution *= 1.0 + growth_rate / 100.0;
    }

    /// Pay this month's contribution into the taxed bucket
    pub fn contribute(&mut self) -> f64 {
        let contribution = self.monthly_contribution;
        self.taxed_balance += contribution;
        self.total_contributions += contribution;
        contribution
    }

    /// Credit interest on the combined balance to the untaxed bucket
    pub fn accrue_interest(&mut self, monthly_rate: f64) -> f64 {
        let interest = (self.taxed_balance + self.untaxed_balance) * monthly_rate;
        self.untaxed_balance += interest;
        self.total_interest += interest;
        interest
    }

    /// Deduct every fee entry active at the current month from unrealized gains
    pub fn charge_fees(&mut self, schedule: &FeeSchedule, horizon_months: u32) -> f64 {
        let mut charged = 0.0;
        for entry in schedule.active_entries(self.month_index, horizon_months) {
            self.untaxed_balance -= entry.monthly_fee;
            self.total_fees_paid += entry.monthly_fee;
            charged += entry.monthly_fee;
        }
        charged
    }

    /// Close the current month
    pub fn advance_month(&mut self) {
        self.month_index += 1;
    }

    /// Realize all unrealized gains at `tax_rate` percent and re-deposit them.
    ///
    /// Returns `(realized_gains, tax_paid)`.
    pub fn realize_gains(&mut self, tax_rate: f64) -> (f64, f64) {
        let realized = self.untaxed_balance;
        let net = realized * (1.0 - tax_rate / 100.0);
        self.taxed_balance += net;
        self.untaxed_balance = 0.0;

        let tax = realized - net;
        self.total_reorg_tax += tax;
        (realized, tax)
    }

    /// Move up to `allowance` of unrealized gains into the taxed bucket, untaxed.
    ///
    /// A negative untaxed balance is moved in full, reducing the taxed bucket.
    pub fn harvest_allowance(&mut self, allowance: f64) -> f64 {
        let moved = allowance.min(self.untaxed_balance);
        self.untaxed_balance -= moved;
        self.taxed_balance += moved;
        self.total_allowance_harvested += moved;
        moved
    }
}
