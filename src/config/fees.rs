//! Absolute monthly fee schedules charged by a wrapper contract

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Last month at which a fee is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeThreshold {
    /// Last cumulative month index (0-based), inclusive
    Month(u32),
    /// Charged in every month of the simulated horizon, whatever its length
    Horizon,
}

impl FeeThreshold {
    /// Concrete inclusive threshold for a run of `horizon_months`
    pub fn resolve(self, horizon_months: u32) -> u32 {
        match self {
            FeeThreshold::Month(month) => month,
            FeeThreshold::Horizon => horizon_months,
        }
    }
}

impl From<Option<u32>> for FeeThreshold {
    fn from(month: Option<u32>) -> Self {
        month.map_or(FeeThreshold::Horizon, FeeThreshold::Month)
    }
}

impl From<FeeThreshold> for Option<u32> {
    fn from(threshold: FeeThreshold) -> Self {
        match threshold {
            FeeThreshold::Month(month) => Some(month),
            FeeThreshold::Horizon => None,
        }
    }
}

impl fmt::Display for FeeThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeThreshold::Month(month) => write!(f, "month {}", month),
            FeeThreshold::Horizon => write!(f, "horizon"),
        }
    }
}

/// One fee obligation: `monthly_fee` is charged every month from month 0
/// through `threshold` inclusive.
///
/// Serialized as a `[threshold, fee]` pair; a `null` threshold runs through
/// the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Option<u32>, f64)", into = "(Option<u32>, f64)")]
pub struct FeeEntry {
    pub threshold: FeeThreshold,
    /// Fee in currency per month
    pub monthly_fee: f64,
}

impl FeeEntry {
    pub fn new(month_threshold: u32, monthly_fee: f64) -> Self {
        Self {
            threshold: FeeThreshold::Month(month_threshold),
            monthly_fee,
        }
    }

    /// Fee charged in every month of the horizon
    pub fn through_horizon(monthly_fee: f64) -> Self {
        Self {
            threshold: FeeThreshold::Horizon,
            monthly_fee,
        }
    }

    /// Whether the fee is charged at the given cumulative month index
    pub fn is_active(&self, month_index: u32, horizon_months: u32) -> bool {
        month_index <= self.threshold.resolve(horizon_months)
    }
}

impl From<(Option<u32>, f64)> for FeeEntry {
    fn from((threshold, monthly_fee): (Option<u32>, f64)) -> Self {
        Self {
            threshold: threshold.into(),
            monthly_fee,
        }
    }
}

impl From<FeeEntry> for (Option<u32>, f64) {
    fn from(entry: FeeEntry) -> Self {
        (entry.threshold.into(), entry.monthly_fee)
    }
}

/// Ordered list of fee obligations. Entries are additive: several may be
/// active in the same month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeSchedule {
    entries: Vec<FeeEntry>,
}

impl FeeSchedule {
    /// Schedule with no fees
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(entries: Vec<FeeEntry>) -> Self {
        Self { entries }
    }

    /// Build from `(month_threshold, monthly_fee)` pairs
    pub fn from_pairs(pairs: &[(u32, f64)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|&(month, fee)| FeeEntry::new(month, fee))
                .collect(),
        }
    }

    /// Contract fees of the reference configuration: 28.88/month through
    /// month 60 (acquisition) plus 17.86/month until payout (administration)
    pub fn default_contract() -> Self {
        Self::new(vec![
            FeeEntry::new(60, 28.88),
            FeeEntry::through_horizon(17.86),
        ])
    }

    pub fn entries(&self) -> &[FeeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: FeeEntry) {
        self.entries.push(entry);
    }

    /// Entries charged at the given cumulative month index, in schedule order
    pub fn active_entries(
        &self,
        month_index: u32,
        horizon_months: u32,
    ) -> impl Iterator<Item = &FeeEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.is_active(month_index, horizon_months))
    }

    /// Sum of all fees charged at the given cumulative month index
    pub fn fee_for_month(&self, month_index: u32, horizon_months: u32) -> f64 {
        self.active_entries(month_index, horizon_months)
            .map(|e| e.monthly_fee)
            .sum()
    }

    /// Fixed-month entries whose threshold lies past the last month of the horizon
    pub fn entries_beyond(&self, horizon_months: u32) -> impl Iterator<Item = &FeeEntry> + '_ {
        self.entries.iter().filter(move |e| match e.threshold {
            FeeThreshold::Month(month) => month > horizon_months,
            FeeThreshold::Horizon => false,
        })
    }

    /// Total fees charged over a horizon, computed per entry in closed form
    pub fn total_over(&self, horizon_months: u32) -> f64 {
        self.entries
            .iter()
            .map(|e| {
                let active_months = e
                    .threshold
                    .resolve(horizon_months)
                    .saturating_add(1)
                    .min(horizon_months);
                e.monthly_fee * active_months as f64
            })
            .sum()
    }

    /// Reject entries with negative or non-finite fees
    pub fn validate(&self) -> Result<()> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if !entry.monthly_fee.is_finite() || entry.monthly_fee < 0.0 {
                return Err(SimulationError::invalid(
                    "fee_schedule",
                    format!(
                        "entry {} ({}) has fee {}, expected a finite non-negative amount",
                        idx, entry.threshold, entry.monthly_fee
                    ),
                ));
            }
        }
        Ok(())
    }
}
