//! Comparison configuration: documented defaults, file overrides and CLI flags

mod fees;
pub mod loader;

pub use fees::{FeeEntry, FeeSchedule, FeeThreshold};
pub use loader::{load_fee_schedule, load_fee_schedule_from_reader};

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::comparison::{ComparisonInputs, ScenarioConfig};
use crate::error::Result;
use crate::projection::RateModel;

/// Immutable description of an unwrapped-vs-wrapped comparison.
///
/// All rates are in percent units (`7.0` is 7%). Fields missing from a
/// config file take the values of [`ComparisonConfig::default_reference`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Investment horizon in months
    pub horizon_months: u32,
    /// Initial monthly contribution
    pub monthly_contribution: f64,
    /// Annual growth of the contribution (percent per year)
    pub contribution_growth_rate: f64,
    /// Gross annual return of the unwrapped investment
    pub unwrapped_gross_rate: f64,
    /// Gross annual return of the funds inside the wrapper
    pub wrapped_gross_rate: f64,
    /// Running fee of the unwrapped funds (percent per year)
    pub unwrapped_fund_fee: f64,
    /// Running fee of the funds inside the wrapper (percent per year)
    pub wrapped_fund_fee: f64,
    /// Running fee of the wrapper contract itself (percent per year)
    pub wrapper_fee: f64,
    /// Absolute monthly fees of the wrapper contract
    pub fee_schedule: FeeSchedule,
    /// Annual tax-free gains allowance of the unwrapped investment
    pub annual_tax_free_allowance: f64,
    /// Capital gains tax rate outside the wrapper
    pub regular_tax_rate: f64,
    /// Tax rate on wrapped gains at payout
    pub wrapped_tax_rate: f64,
    /// Portfolio reorganizations of the unwrapped investment
    pub reorg_event_count: u32,
    /// Monthly rate derivation
    pub rate_model: RateModel,
}

impl ComparisonConfig {
    /// Defaults of the reference comparison: 33 years of 150/month at 7%
    pub fn default_reference() -> Self {
        Self {
            horizon_months: 33 * 12,
            monthly_contribution: 150.0,
            contribution_growth_rate: 0.0,
            unwrapped_gross_rate: 7.0,
            wrapped_gross_rate: 7.0,
            unwrapped_fund_fee: 0.22,
            wrapped_fund_fee: 1.35,
            wrapper_fee: 0.35,
            fee_schedule: FeeSchedule::default_contract(),
            annual_tax_free_allowance: 0.0,
            regular_tax_rate: 25.0,
            wrapped_tax_rate: 10.0,
            reorg_event_count: 0,
            rate_model: RateModel::Geometric,
        }
    }

    /// Load a JSON override file; absent fields keep their defaults
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Canonical scenario pair: A is the unwrapped investment (allowance,
    /// reorganizations taxed at the regular rate), B is the wrapper
    /// (absolute fee schedule, reduced final tax).
    pub fn to_inputs(&self) -> ComparisonInputs {
        let unwrapped = ScenarioConfig::new(
            self.unwrapped_gross_rate,
            self.unwrapped_fund_fee,
            self.regular_tax_rate,
        )
        .with_reorganizations(self.reorg_event_count, self.regular_tax_rate)
        .with_tax_free_allowance(self.annual_tax_free_allowance);

        let wrapped = ScenarioConfig::new(
            self.wrapped_gross_rate,
            self.wrapped_fund_fee + self.wrapper_fee,
            self.wrapped_tax_rate,
        )
        .with_fee_schedule(self.fee_schedule.clone());

        ComparisonInputs {
            horizon_months: self.horizon_months,
            monthly_contribution: self.monthly_contribution,
            contribution_growth_rate: self.contribution_growth_rate,
            rate_model: self.rate_model,
            scenario_a: unwrapped,
            scenario_b: wrapped,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self::default_reference()
    }
}

/// Configuration flags shared by the command-line front-ends.
///
/// Precedence: flag, then config file, then built-in default.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// JSON file overriding the default configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV fee schedule (`month_threshold,monthly_fee`) for the wrapper;
    /// an empty threshold charges the fee until the horizon
    #[arg(long, value_name = "CSV")]
    pub fees: Option<PathBuf>,

    /// Investment horizon in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Initial monthly contribution
    #[arg(long)]
    pub contribution: Option<f64>,

    /// Annual contribution growth in percent
    #[arg(long)]
    pub contribution_growth: Option<f64>,

    /// Gross annual return outside the wrapper, percent
    #[arg(long, allow_hyphen_values = true)]
    pub unwrapped_rate: Option<f64>,

    /// Gross annual return inside the wrapper, percent
    #[arg(long, allow_hyphen_values = true)]
    pub wrapped_rate: Option<f64>,

    /// Annual tax-free gains allowance
    #[arg(long)]
    pub allowance: Option<f64>,

    /// Number of portfolio reorganizations outside the wrapper
    #[arg(long)]
    pub reorg_events: Option<u32>,

    /// Capital gains tax rate outside the wrapper, percent
    #[arg(long)]
    pub regular_tax: Option<f64>,

    /// Payout tax rate inside the wrapper, percent
    #[arg(long)]
    pub wrapped_tax: Option<f64>,

    /// Monthly rate derivation
    #[arg(long, value_enum)]
    pub rate_model: Option<RateModel>,
}

impl ConfigArgs {
    /// Build the effective configuration from defaults, file and flags
    pub fn resolve(&self) -> Result<ComparisonConfig> {
        let mut config = match &self.config {
            Some(path) => ComparisonConfig::from_json_path(path)?,
            None => ComparisonConfig::default_reference(),
        };

        if let Some(path) = &self.fees {
            config.fee_schedule = load_fee_schedule(path)?;
        }
        if let Some(v) = self.months {
            config.horizon_months = v;
        }
        if let Some(v) = self.contribution {
            config.monthly_contribution = v;
        }
        if let Some(v) = self.contribution_growth {
            config.contribution_growth_rate = v;
        }
        if let Some(v) = self.unwrapped_rate {
            config.unwrapped_gross_rate = v;
        }
        if let Some(v) = self.wrapped_rate {
            config.wrapped_gross_rate = v;
        }
        if let Some(v) = self.allowance {
            config.annual_tax_free_allowance = v;
        }
        if let Some(v) = self.reorg_events {
            config.reorg_event_count = v;
        }
        if let Some(v) = self.regular_tax {
            config.regular_tax_rate = v;
        }
        if let Some(v) = self.wrapped_tax {
            config.wrapped_tax_rate = v;
        }
        if let Some(v) = self.rate_model {
            config.rate_model = v;
        }

        for entry in config.fee_schedule.entries_beyond(config.horizon_months) {
            warn!(
                "Fee of {:.2} runs through {}, past the {}-month horizon",
                entry.monthly_fee, entry.threshold, config.horizon_months
            );
        }

        Ok(config)
    }
}
